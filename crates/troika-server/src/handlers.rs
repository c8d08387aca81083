//! HTTP handlers, organized by domain: users/settings, views, task actions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use troika_core::ids::{TaskId, UserId};
use troika_core::page::Page;
use troika_core::settings::UserSettings;
use troika_core::task::{Category, Task};
use troika_engine::{
    DisplayTracker, MoveOutcome, NowView, TaskLifecycle, TierView, ViewEngine,
};
use troika_store::{Database, TaskRepo, UserRepo, UserRow};

use crate::error::ApiError;

/// Shared state available to all handlers.
pub struct AppState {
    pub users: UserRepo,
    pub tasks: TaskRepo,
    pub lifecycle: TaskLifecycle,
    pub views: ViewEngine,
}

impl AppState {
    pub fn new(db: Database, display: Arc<DisplayTracker>) -> Self {
        Self {
            users: UserRepo::new(db.clone()),
            tasks: TaskRepo::new(db.clone()),
            lifecycle: TaskLifecycle::new(TaskRepo::new(db.clone())),
            views: ViewEngine::new(db, display),
        }
    }
}

// ── Request / response payloads ──

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub external_ref: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct MoveTaskResponse {
    pub task: Task,
    pub outcome: MoveOutcome,
}

#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    #[serde(default)]
    pub reshuffle: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
}

/// Parse a category name from the request, rejecting anything outside the
/// enumerated set with an explicit 422.
fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::unprocessable(format!("unknown category: {raw}")))
}

// ── Health ──

pub async fn health() -> &'static str {
    "ok"
}

// ── Users & settings ──

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserRow>, ApiError> {
    let user = state.users.get_or_create(&req.external_ref)?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserRow>, ApiError> {
    let user = state.users.get(&UserId::from_raw(user_id))?;
    Ok(Json(user))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<UserRow>, ApiError> {
    let user = state
        .users
        .update_settings(&UserId::from_raw(user_id), settings)?;
    Ok(Json(user))
}

// ── Views ──

pub async fn now_view(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<NowQuery>,
) -> Result<Json<NowView>, ApiError> {
    let user = state.users.get(&UserId::from_raw(user_id))?;
    let limit = user.settings.now_display_limit as usize;
    let view = state.views.now_view(&user.id, limit, query.reshuffle)?;
    Ok(Json(view))
}

pub async fn tier_view(
    State(state): State<Arc<AppState>>,
    Path((user_id, category)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TierView>, ApiError> {
    let category = parse_category(&category)?;
    if category == Category::Now {
        return Err(ApiError::unprocessable(
            "the now tier is not paginated; use the now view",
        ));
    }
    let user = state.users.get(&UserId::from_raw(user_id))?;
    let view = state.views.tier_view(&user.id, category, query.page)?;
    Ok(Json(view))
}

pub async fn completed_view(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Task>>, ApiError> {
    let user = state.users.get(&UserId::from_raw(user_id))?;
    let page = state.views.completed_view(&user.id, query.page)?;
    Ok(Json(page))
}

// ── Task actions ──

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let user = state.users.get(&UserId::from_raw(user_id))?;
    let category = req.category.as_deref().map(parse_category).transpose()?;
    let task = state.lifecycle.create(&user.id, &req.content, category)?;
    Ok(Json(task))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.tasks.get(&TaskId::from_raw(task_id))?;
    Ok(Json(task))
}

pub async fn edit_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(req): Json<EditTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .lifecycle
        .edit_content(&TaskId::from_raw(task_id), &req.content)?;
    Ok(Json(task))
}

pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<MoveTaskResponse>, ApiError> {
    let target = parse_category(&req.category)?;
    let (task, outcome) = state.lifecycle.move_to(&TaskId::from_raw(task_id), target)?;
    Ok(Json(MoveTaskResponse { task, outcome }))
}

pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.lifecycle.complete(&TaskId::from_raw(task_id))?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.lifecycle.delete(&TaskId::from_raw(task_id))?;
    Ok(StatusCode::NO_CONTENT)
}

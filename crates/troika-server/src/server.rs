use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use troika_engine::DisplayTracker;
use troika_store::Database;

use crate::handlers::{self, AppState};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8321 }
    }
}

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/users", post(handlers::create_user))
        .route("/users/{user_id}", get(handlers::get_user))
        .route("/users/{user_id}/settings", put(handlers::update_settings))
        .route("/users/{user_id}/views/now", get(handlers::now_view))
        .route(
            "/users/{user_id}/views/completed",
            get(handlers::completed_view),
        )
        .route(
            "/users/{user_id}/views/{category}",
            get(handlers::tier_view),
        )
        .route("/users/{user_id}/tasks", post(handlers::create_task))
        .route("/tasks/{task_id}", get(handlers::get_task))
        .route("/tasks/{task_id}", patch(handlers::edit_task))
        .route("/tasks/{task_id}", delete(handlers::delete_task))
        .route("/tasks/{task_id}/move", post(handlers::move_task))
        .route("/tasks/{task_id}/complete", post(handlers::complete_task))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle to a running server.
pub struct ServerHandle {
    pub port: u16,
    join: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub fn shutdown(self) {
        self.join.abort();
    }

    /// Wait for the serve task to finish.
    pub async fn wait(self) {
        let _ = self.join.await;
    }
}

/// Create and start the server.
pub async fn start(config: ServerConfig, db: Database) -> Result<ServerHandle, std::io::Error> {
    let display = Arc::new(DisplayTracker::new());
    let state = Arc::new(AppState::new(db, display));
    let router = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "troika server started");

    let join = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "server exited");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        join,
    })
}

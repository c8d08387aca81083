use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use troika_core::ids::{TaskId, UserId};
use troika_core::task::{Category, Task};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// Active task counts per urgency tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub now: u32,
    pub soon: u32,
    pub someday: u32,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Now => self.now,
            Category::Soon => self.soon,
            Category::Someday => self.someday,
        }
    }
}

/// Task record access. Executes mutations; state validation belongs to the
/// lifecycle layer in troika-engine.
pub struct TaskRepo {
    db: Database,
}

impl TaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new task.
    #[instrument(skip(self, content), fields(user_id = %user_id, category = %category))]
    pub fn create(
        &self,
        user_id: &UserId,
        content: &str,
        category: Category,
    ) -> Result<Task, StoreError> {
        let id = TaskId::new();
        let now = Utc::now();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, user_id, content, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.as_str(),
                    user_id.as_str(),
                    content,
                    category.as_str(),
                    now.to_rfc3339(),
                ],
            )?;

            Ok(Task {
                id: id.clone(),
                user_id: user_id.clone(),
                content: content.to_string(),
                category,
                created_at: now,
                completed_at: None,
                shown_count: 0,
                last_shown_at: None,
            })
        })
    }

    /// Get a task by ID.
    pub fn get(&self, id: &TaskId) -> Result<Task, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql("WHERE id = ?1"))?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_task(row),
                None => Err(StoreError::NotFound(format!("task {id}"))),
            }
        })
    }

    /// Active tasks for a user in one category, ordered by creation time
    /// ascending. Optional limit/offset for windowed fetches.
    #[instrument(skip(self), fields(user_id = %user_id, category = %category))]
    pub fn active_by_category(
        &self,
        user_id: &UserId,
        category: Category,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Task>, StoreError> {
        let sql = match limit {
            Some(_) => select_sql(
                "WHERE user_id = ?1 AND category = ?2 AND completed_at IS NULL
                 ORDER BY created_at ASC LIMIT ?3 OFFSET ?4",
            ),
            None => select_sql(
                "WHERE user_id = ?1 AND category = ?2 AND completed_at IS NULL
                 ORDER BY created_at ASC",
            ),
        };

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut results = Vec::new();
            let mut rows = match limit {
                Some(limit) => stmt.query(rusqlite::params![
                    user_id.as_str(),
                    category.as_str(),
                    limit,
                    offset.unwrap_or(0),
                ])?,
                None => stmt.query(rusqlite::params![user_id.as_str(), category.as_str()])?,
            };
            while let Some(row) = rows.next()? {
                results.push(row_to_task(row)?);
            }
            Ok(results)
        })
    }

    /// Active task counts across all three tiers.
    pub fn counts(&self, user_id: &UserId) -> Result<CategoryCounts, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT category, COUNT(*) FROM tasks
                 WHERE user_id = ?1 AND completed_at IS NULL
                 GROUP BY category",
            )?;
            let mut counts = CategoryCounts::default();
            let mut rows = stmt.query([user_id.as_str()])?;
            while let Some(row) = rows.next()? {
                let raw: String = row_helpers::get(row, 0, "tasks", "category")?;
                let count: u32 = row_helpers::get(row, 1, "tasks", "count")?;
                match row_helpers::parse_enum(&raw, "tasks", "category")? {
                    Category::Now => counts.now = count,
                    Category::Soon => counts.soon = count,
                    Category::Someday => counts.someday = count,
                }
            }
            Ok(counts)
        })
    }

    /// Completed tasks, newest completion first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn completed(
        &self,
        user_id: &UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&select_sql(
                "WHERE user_id = ?1 AND completed_at IS NOT NULL
                 ORDER BY completed_at DESC LIMIT ?2 OFFSET ?3",
            ))?;
            let mut rows = stmt.query(rusqlite::params![user_id.as_str(), limit, offset])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_task(row)?);
            }
            Ok(results)
        })
    }

    pub fn count_completed(&self, user_id: &UserId) -> Result<u32, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND completed_at IS NOT NULL",
                [user_id.as_str()],
                |row| row.get(0),
            )
            .map_err(StoreError::from)
        })
    }

    /// Replace the content of an active task. A completed task is left
    /// untouched; the caller inspects the returned record.
    #[instrument(skip(self, content), fields(task_id = %id))]
    pub fn update_content(&self, id: &TaskId, content: &str) -> Result<Task, StoreError> {
        self.update_active(id, |conn| {
            conn.execute(
                "UPDATE tasks SET content = ?2 WHERE id = ?1 AND completed_at IS NULL",
                rusqlite::params![id.as_str(), content],
            )
        })
    }

    /// Move an active task to a different tier. A completed task is left
    /// untouched.
    #[instrument(skip(self), fields(task_id = %id, category = %category))]
    pub fn update_category(&self, id: &TaskId, category: Category) -> Result<Task, StoreError> {
        self.update_active(id, |conn| {
            conn.execute(
                "UPDATE tasks SET category = ?2 WHERE id = ?1 AND completed_at IS NULL",
                rusqlite::params![id.as_str(), category.as_str()],
            )
        })
    }

    /// Stamp `completed_at`. Guarded so a second call never moves the
    /// original completion time.
    #[instrument(skip(self), fields(task_id = %id))]
    pub fn mark_completed(&self, id: &TaskId) -> Result<Task, StoreError> {
        let now = Utc::now();
        self.update_active(id, |conn| {
            conn.execute(
                "UPDATE tasks SET completed_at = ?2 WHERE id = ?1 AND completed_at IS NULL",
                rusqlite::params![id.as_str(), now.to_rfc3339()],
            )
        })
    }

    /// Record one display: bump `shown_count`, stamp `last_shown_at`.
    /// Stats never land on a completed task.
    #[instrument(skip(self), fields(task_id = %id))]
    pub fn record_shown(&self, id: &TaskId) -> Result<Task, StoreError> {
        let now = Utc::now();
        self.update_active(id, |conn| {
            conn.execute(
                "UPDATE tasks SET shown_count = shown_count + 1, last_shown_at = ?2
                 WHERE id = ?1 AND completed_at IS NULL",
                rusqlite::params![id.as_str(), now.to_rfc3339()],
            )
        })
    }

    /// Hard-delete a task. No tombstone.
    #[instrument(skip(self), fields(task_id = %id))]
    pub fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", [id.as_str()])?;
            if affected == 0 {
                return Err(StoreError::NotFound(format!("task {id}")));
            }
            Ok(())
        })
    }

    /// Run a guarded update against one task, then return the current
    /// record. The statements carry their own state condition, so zero rows
    /// affected means either missing or completed; get() resolves which.
    fn update_active<F>(&self, id: &TaskId, exec: F) -> Result<Task, StoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<usize, rusqlite::Error>,
    {
        self.db
            .with_conn(|conn| exec(conn).map_err(StoreError::from))?;
        self.get(id)
    }
}

const TASK_COLUMNS: &str =
    "id, user_id, content, category, created_at, completed_at, shown_count, last_shown_at";

fn select_sql(tail: &str) -> String {
    format!("SELECT {TASK_COLUMNS} FROM tasks {tail}")
}

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, StoreError> {
    let category: String = row_helpers::get(row, 3, "tasks", "category")?;
    let created_at: String = row_helpers::get(row, 4, "tasks", "created_at")?;
    let completed_at: Option<String> = row_helpers::get_opt(row, 5, "tasks", "completed_at")?;
    let last_shown_at: Option<String> = row_helpers::get_opt(row, 7, "tasks", "last_shown_at")?;

    Ok(Task {
        id: TaskId::from_raw(row_helpers::get::<String>(row, 0, "tasks", "id")?),
        user_id: UserId::from_raw(row_helpers::get::<String>(row, 1, "tasks", "user_id")?),
        content: row_helpers::get(row, 2, "tasks", "content")?,
        category: row_helpers::parse_enum(&category, "tasks", "category")?,
        created_at: row_helpers::parse_datetime(&created_at, "tasks", "created_at")?,
        completed_at: row_helpers::parse_datetime_opt(completed_at, "tasks", "completed_at")?,
        shown_count: row_helpers::get(row, 6, "tasks", "shown_count")?,
        last_shown_at: row_helpers::parse_datetime_opt(last_shown_at, "tasks", "last_shown_at")?,
    })
}

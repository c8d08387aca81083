use tracing::{debug, info};

use troika_core::ids::{TaskId, UserId};
use troika_core::task::{Category, Task};
use troika_store::TaskRepo;

use crate::error::EngineError;

/// Result of a category move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    /// Target equals the current category: a successful no-op, distinct
    /// from an invalid target (which is rejected at the parse boundary).
    Unchanged,
}

/// The task lifecycle state machine.
///
/// Category ∈ {now, soon, someday} is orthogonal to the lifecycle flag
/// (active → completed → deleted). The active-only mutations are guarded in
/// the store statement itself, so a concurrent completion can never land
/// stats or edits on a completed task; this layer turns a guarded no-op
/// into the transition error.
pub struct TaskLifecycle {
    tasks: TaskRepo,
}

impl TaskLifecycle {
    pub fn new(tasks: TaskRepo) -> Self {
        Self { tasks }
    }

    /// Create a task. Content must be non-empty; the category defaults to
    /// `someday` when the caller does not pick one.
    pub fn create(
        &self,
        user: &UserId,
        content: &str,
        category: Option<Category>,
    ) -> Result<Task, EngineError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(EngineError::EmptyContent);
        }
        let task = self
            .tasks
            .create(user, content, category.unwrap_or_default())?;
        info!(task_id = %task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// Move an active task to a target tier. Moving to the current tier is
    /// a successful no-op that leaves the record untouched.
    pub fn move_to(
        &self,
        id: &TaskId,
        target: Category,
    ) -> Result<(Task, MoveOutcome), EngineError> {
        let task = self.tasks.get(id)?;
        if task.is_completed() {
            return Err(EngineError::invalid_transition(id.clone(), "move"));
        }
        if task.category == target {
            debug!(task_id = %id, category = %target, "move is a no-op");
            return Ok((task, MoveOutcome::Unchanged));
        }
        let moved = self.tasks.update_category(id, target)?;
        if moved.is_completed() {
            return Err(EngineError::invalid_transition(id.clone(), "move"));
        }
        info!(task_id = %id, from = %task.category, to = %target, "task moved");
        Ok((moved, MoveOutcome::Moved))
    }

    /// Complete an active task. Idempotent: completing again returns the
    /// record unchanged, preserving the original completion time.
    pub fn complete(&self, id: &TaskId) -> Result<Task, EngineError> {
        let task = self.tasks.get(id)?;
        if task.is_completed() {
            debug!(task_id = %id, "already completed");
            return Ok(task);
        }
        let completed = self.tasks.mark_completed(id)?;
        info!(task_id = %id, "task completed");
        Ok(completed)
    }

    /// Hard-delete a task. Valid from active or completed; terminal.
    pub fn delete(&self, id: &TaskId) -> Result<(), EngineError> {
        self.tasks.delete(id)?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Record one display of an active task: `shown_count += 1` and a fresh
    /// `last_shown_at`. Called once per task per selection.
    pub fn record_shown(&self, id: &TaskId) -> Result<Task, EngineError> {
        let task = self.tasks.record_shown(id)?;
        if task.is_completed() {
            return Err(EngineError::invalid_transition(id.clone(), "record display of"));
        }
        Ok(task)
    }

    /// Replace the content of an active task. Category and shown-stats are
    /// untouched.
    pub fn edit_content(&self, id: &TaskId, new_content: &str) -> Result<Task, EngineError> {
        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(EngineError::EmptyContent);
        }
        let task = self.tasks.update_content(id, new_content)?;
        if task.is_completed() {
            return Err(EngineError::invalid_transition(id.clone(), "edit"));
        }
        Ok(task)
    }
}

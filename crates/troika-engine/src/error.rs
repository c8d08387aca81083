use troika_core::ids::TaskId;
use troika_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Lifecycle operation attempted from a state that does not allow it,
    /// e.g. editing a completed task.
    #[error("cannot {op} {state} task {id}")]
    InvalidTransition {
        id: TaskId,
        op: &'static str,
        state: &'static str,
    },

    /// Task content must be non-empty.
    #[error("task content is empty")]
    EmptyContent,
}

impl EngineError {
    pub fn invalid_transition(id: TaskId, op: &'static str) -> Self {
        Self::InvalidTransition {
            id,
            op,
            state: "completed",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

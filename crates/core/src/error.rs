use crate::types::DbId;

/// Domain-level error type shared by the repository, service, and API layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Operation requires state '{required}' but record is '{current}'")]
    StateViolation {
        current: String,
        required: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a [`CoreError::StateViolation`] carrying the current and the
    /// required workflow state.
    pub fn state_violation(current: impl Into<String>, required: &'static str) -> Self {
        CoreError::StateViolation {
            current: current.into(),
            required,
        }
    }
}

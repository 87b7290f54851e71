//! Service error type: domain rule failures plus database failures, kept
//! separate so the API layer can classify each on its own.

use telestaff_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ServiceError {
    /// Shorthand for a not-found failure on a given entity.
    pub fn not_found(entity: &'static str, id: telestaff_core::types::DbId) -> Self {
        ServiceError::Core(CoreError::NotFound { entity, id })
    }
}

//! crates/classroom_core/src/error.rs
//!
//! Error taxonomy for the scoring and recommendation engine.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The caller supplied input the engine refuses to store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external AI collaborator (transcription, embeddings) failed.
    #[error("Dependency error: {0}")]
    Dependency(#[source] PortError),

    /// The data store failed or rejected the operation.
    #[error("Persistence error: {0}")]
    Persistence(#[source] PortError),
}

impl CoreError {
    /// True when the underlying store reported a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Persistence(PortError::NotFound(_)))
    }
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the mapping of engine
//! errors onto HTTP status codes.

use crate::config::ConfigError;
use axum::http::StatusCode;
use classroom_core::error::CoreError;
use classroom_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while running the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The status code a handler answers with for an engine error.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Dependency(_) => StatusCode::BAD_GATEWAY,
        CoreError::Persistence(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts an engine error into the `(StatusCode, String)` rejection used by handlers.
///
/// Server-side failures are logged and reported with a generic message.
pub fn reject(context: &str, err: CoreError) -> (StatusCode, String) {
    let status = status_for(&err);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => (status, err.to_string()),
        StatusCode::BAD_GATEWAY => {
            error!("{}: {:?}", context, err);
            (status, format!("{}: an upstream service is unavailable", context))
        }
        _ => {
            error!("{}: {:?}", context, err);
            (status, context.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_statuses() {
        assert_eq!(
            status_for(&CoreError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CoreError::Dependency(PortError::Unexpected("down".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&CoreError::Persistence(PortError::NotFound("goal".into()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CoreError::Persistence(PortError::Unexpected("db".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn startup_failures_convert_into_api_error() {
        let err: ApiError = ConfigError::MissingVar("DATABASE_URL".into()).into();
        assert!(matches!(err, ApiError::Config(_)));
        let err: ApiError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy").into();
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[test]
    fn internal_failures_hide_details() {
        let (status, message) = reject(
            "Failed to load goals",
            CoreError::Persistence(PortError::Unexpected("password=hunter2".into())),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to load goals");
    }
}

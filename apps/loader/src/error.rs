//! Domain error types for the CI telemetry loader.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Unparseable run id, run URL or batch document
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Defect resolution ran against a different test/job universe than ingestion
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// External defect tracker answered only partially
    #[error("Upstream lookup degraded: {0}")]
    UpstreamLookupDegraded(String),

    /// Reading a batch or defect file failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// True for errors that signal a consistency bug rather than a recoverable failure.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, AppError::InvariantViolation(_))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

use thiserror::Error;

/// Failures surfaced by the domain layer.
///
/// Each variant corresponds to one HTTP status in the REST layer; storage
/// failures arrive as `anyhow::Error` and are reported as `Internal`.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AttendanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn student_not_found() -> Self {
        Self::NotFound("Student not found".to_string())
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, AttendanceError>;

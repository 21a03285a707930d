//! Common error types and handling for Promoreel

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Promoreel application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition error: {0}")]
    Precondition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Get the error code for user-visible reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Precondition(_) => "PRECONDITION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Service(_) => "SERVICE_ERROR",
        }
    }

    /// True when the error was caught locally, before any request reached the
    /// project service. Local errors leave both local and remote state untouched.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Precondition(_) | Error::NotFound(_)
        )
    }
}

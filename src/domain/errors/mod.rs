// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// The concatenation request breaks a domain rule (item count, item state)
    ValidationFailed(String),
    /// A scratch artifact could not be created or written
    FsFail(String),
    /// Media metadata could not be read
    ProbeFail(String),
    /// The execution facility refused or lost a job
    DispatchFail(String),
    /// Configuration could not be loaded or is invalid
    ConfigFail(String),
}

impl DomainError {
    /// Whether the message is meant to be shown to the user verbatim.
    ///
    /// Everything else is internal and should be reported as a generic failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, DomainError::BadArgs(_) | DomainError::ValidationFailed(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::ValidationFailed(msg) => write!(f, "{}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::ProbeFail(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::DispatchFail(msg) => write!(f, "Dispatch failed: {}", msg),
            DomainError::ConfigFail(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}

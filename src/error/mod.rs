//! Error handling module for ConcatX

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ConcatX operations
#[derive(Error, Debug)]
pub enum ConcatXError {
    /// Error raised by planning, probing or dispatch
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Output location cannot be used
    #[error("Invalid output {path}: {message}")]
    InvalidOutput { path: String, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConcatXError {
    /// True when the message is meant to be shown to the user as-is
    pub fn is_user_facing(&self) -> bool {
        match self {
            ConcatXError::Domain(e) => e.is_user_facing(),
            ConcatXError::InvalidOutput { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::ITEMS_NOT_READY_MESSAGE;

    #[test]
    fn test_validation_message_passes_through() {
        let err: ConcatXError =
            DomainError::ValidationFailed(ITEMS_NOT_READY_MESSAGE.to_string()).into();
        assert_eq!(err.to_string(), ITEMS_NOT_READY_MESSAGE);
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_serialization_error_is_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConcatXError = json_err.into();
        assert!(err.to_string().starts_with("JSON error:"));
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_invalid_output_is_user_facing() {
        let err = ConcatXError::InvalidOutput {
            path: "out.mp4".to_string(),
            message: "is a directory".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid output out.mp4: is a directory");
        assert!(err.is_user_facing());
    }
}

//! Error types for the attack engine

use thiserror::Error;

/// Main error type for attack engine operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttackError {
    #[error("Attack configuration invalid: {reason}")]
    InvalidAttackConfig { reason: String },

    #[error("Input validation failed: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Network error: {details}")]
    NetworkError { details: String },

    #[error("Request execution failed: {error}")]
    ExecutionFailed { error: String },
}

impl AttackError {
    /// Create a validation error with field and reason
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid attack configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidAttackConfig {
            reason: reason.into(),
        }
    }

    /// Get suggested remediation for the error
    pub fn remediation(&self) -> String {
        match self {
            AttackError::InvalidAttackConfig { reason } => {
                format!("Attack configuration invalid: {}. Review --timeout, --pace, --stats, --rounds and --max-in-flight.", reason)
            }
            AttackError::ValidationError { field, reason } => {
                format!("Input validation failed for '{}': {}. Correct the input and try again.", field, reason)
            }
            AttackError::NetworkError { details } => {
                format!("Network error: {}. Check TLS support and local network settings.", details)
            }
            AttackError::ExecutionFailed { error } => {
                format!("Engine task failed: {}. This is a bug, please report it.", error)
            }
        }
    }
}

impl From<tokio::task::JoinError> for AttackError {
    fn from(error: tokio::task::JoinError) -> Self {
        AttackError::ExecutionFailed {
            error: error.to_string(),
        }
    }
}

/// Result type for attack engine operations
pub type AttackResult<T> = Result<T, AttackError>;

/// Failure of a single fetch attempt.
///
/// `Build` means the request never left the process and is not counted;
/// every other variant is a transport-level failure and counts as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to build request for {target}: {reason}")]
    Build { target: String, reason: String },

    #[error("Request to {target} failed: {reason}")]
    Transport { target: String, reason: String },

    #[error("Request to {target} timed out after {duration_ms}ms")]
    TimedOut { target: String, duration_ms: u64 },

    #[error("Request to {target} cancelled")]
    Cancelled { target: String },
}

impl FetchError {
    /// Whether this failure is recorded as an error outcome
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, FetchError::Build { .. })
    }
}

//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid package parameters.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid configuration: {field} {message}")]
    InvalidConfiguration {
        field: &'static str,
        message: String,
    },
}

impl DomainError {
    /// Field is absent or empty.
    pub fn missing(field: &'static str) -> Self {
        Self::InvalidConfiguration {
            field,
            message: "must be set and non-empty".into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

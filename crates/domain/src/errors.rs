//! Domain error types.

use shared::pagination::PageError;
use thiserror::Error;

/// Errors raised by domain services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Argument '{0}' is required")]
    ArgumentNull(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(what: &str, key: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{what} with '{key}' does not exist"))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| format!("{}: {}", field, m))
                        .unwrap_or_else(|| format!("{}: invalid value", field))
                })
            })
            .collect();
        DomainError::Validation(messages.join(", "))
    }
}

impl From<PageError> for DomainError {
    fn from(err: PageError) -> Self {
        DomainError::Validation(err.to_string())
    }
}

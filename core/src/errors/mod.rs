//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Returns the underlying token error kind, if any
    pub fn as_token_error(&self) -> Option<TokenError> {
        match self {
            DomainError::Token(e) => Some(*e),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

//! Token-specific error types.
//!
//! The validation and rotation paths report failures through a closed kind
//! enumeration so callers can match exhaustively instead of inspecting
//! message strings. User-facing messages are deliberately generic: which
//! specific check failed must not leak to the end user.

use thiserror::Error;

/// Token validation and rotation failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not parse into the expected shape
    #[error("Malformed token")]
    Malformed,

    /// The token signature does not match
    #[error("Invalid token signature")]
    BadSignature,

    /// The token is past its expiry
    #[error("Token expired")]
    Expired,

    /// A record exists for the token but it is no longer active. This is
    /// the reuse signal: the token was already rotated or its family was
    /// revoked.
    #[error("Token is no longer active")]
    Inactive,

    /// No record exists for the token. Treated as invalid, never as reuse;
    /// the token may predate a wiped environment.
    #[error("Token not found")]
    NotFound,

    /// The durable store could not be reached. Issuance and rotation fail
    /// closed rather than trusting the signature alone.
    #[error("Token store unavailable")]
    StoreUnavailable,

    /// Lost the conditional-update race against a concurrent rotation of
    /// the same token. The caller holds no new pair and must re-validate.
    #[error("Concurrent rotation in progress")]
    ConcurrentRotation,

    /// An already-retired token was presented again; its whole family has
    /// been invalidated and the subject must log in again.
    #[error("Refresh token reuse detected")]
    ReuseDetected,
}

impl TokenError {
    /// Stable error code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "MALFORMED_TOKEN",
            TokenError::BadSignature => "BAD_SIGNATURE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::Inactive => "TOKEN_INACTIVE",
            TokenError::NotFound => "TOKEN_NOT_FOUND",
            TokenError::StoreUnavailable => "STORE_UNAVAILABLE",
            TokenError::ConcurrentRotation => "CONCURRENT_ROTATION",
            TokenError::ReuseDetected => "REUSE_DETECTED",
        }
    }

    /// Message safe to show to the end user
    ///
    /// Every validation failure collapses to the same generic message so
    /// the response does not reveal which check rejected the token. Reuse
    /// detection is the exception: the session is terminated and the client
    /// must wipe its stored credentials.
    pub fn public_message(&self) -> &'static str {
        match self {
            TokenError::ReuseDetected => {
                "Your session has been terminated for security reasons. Please log in again."
            }
            _ => "Session invalid, please log in again.",
        }
    }

    /// Whether this failure forces a full re-login on the client
    pub fn forces_relogin(&self) -> bool {
        matches!(self, TokenError::ReuseDetected)
    }
}

//! # Canter Core
//!
//! Session/credential layer for the Canter backend. This crate contains the
//! token domain entities, the repository interface for refresh token
//! persistence, and the services that issue, validate, rotate, and clean up
//! token pairs. Everything else in the backend (riders, horses, grooms,
//! training plans) talks to sessions exclusively through this crate.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::token::{Claims, RefreshTokenRecord, TokenPair, TokenType};
pub use errors::{DomainError, DomainResult, TokenError};
pub use repositories::{MockTokenRepository, TokenRepository};
pub use services::token::{
    CleanupConfig, CleanupHandle, CleanupReport, CleanupService, JwtSigner, TokenService,
    TokenServiceConfig, generate_token_family,
};

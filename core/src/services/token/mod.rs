//! Token service module for session credential management
//!
//! This module handles all token-related operations including:
//! - JWT access and refresh token signing and verification
//! - Token pair issuance with family tracking
//! - Refresh token rotation with reuse detection
//! - Family invalidation when a retired token is presented again
//! - Background cleanup of expired and invalidated records

mod cleanup;
mod config;
mod family;
mod service;
mod signer;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupConfig, CleanupHandle, CleanupReport, CleanupService};
pub use config::TokenServiceConfig;
pub use family::generate_token_family;
pub use service::TokenService;
pub use signer::JwtSigner;

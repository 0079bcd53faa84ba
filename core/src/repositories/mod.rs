//! Repository interfaces for session persistence.
//!
//! Concrete database-backed implementations live in the infrastructure
//! layer; this module defines the contracts plus an in-memory mock used by
//! tests.

pub mod token;

pub use token::{MockTokenRepository, TokenRepository};

//! # Infrastructure Layer
//!
//! Concrete persistence for the Canter session subsystem: the MySQL-backed
//! implementation of `canter_core`'s `TokenRepository`, plus connection
//! pool management. The domain crate never sees a database driver; this
//! crate is the only place SQL lives.

use thiserror::Error;

pub mod config;
pub mod database;

pub use config::DatabaseConfig;
pub use database::{DatabasePool, MySqlTokenRepository};

/// Infrastructure-level failures
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

//! Domain entities for the session layer.

pub mod token;

pub use token::{Claims, RefreshTokenRecord, TokenPair, TokenType};

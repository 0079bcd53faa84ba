//! Business services for the session layer.

pub mod token;

pub use token::{
    CleanupConfig, CleanupHandle, CleanupReport, CleanupService, JwtSigner, TokenService,
    TokenServiceConfig, generate_token_family,
};

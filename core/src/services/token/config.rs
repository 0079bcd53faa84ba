//! Configuration for the token service

use serde::Deserialize;

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_MINUTES, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_DAYS,
};

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

/// Configuration for the token service
///
/// Loaded once at process start and injected into the token service;
/// nothing reads signing keys from ambient global state. Access and
/// refresh tokens are signed with
/// independent secrets so compromise of one cannot forge the other.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenServiceConfig {
    /// Signing secret for access tokens
    pub access_secret: String,
    /// Signing secret for refresh tokens
    pub refresh_secret: String,
    /// Access token expiry in minutes
    #[serde(default = "default_access_expiry_minutes")]
    pub access_token_expiry_minutes: i64,
    /// Refresh token expiry in days
    #[serde(default = "default_refresh_expiry_days")]
    pub refresh_token_expiry_days: i64,
    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_access_expiry_minutes() -> i64 {
    ACCESS_TOKEN_EXPIRY_MINUTES
}

fn default_refresh_expiry_days() -> i64 {
    REFRESH_TOKEN_EXPIRY_DAYS
}

fn default_issuer() -> String {
    JWT_ISSUER.to_string()
}

fn default_audience() -> String {
    JWT_AUDIENCE.to_string()
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_expiry_minutes: ACCESS_TOKEN_EXPIRY_MINUTES,
            refresh_token_expiry_days: REFRESH_TOKEN_EXPIRY_DAYS,
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
        }
    }
}

impl TokenServiceConfig {
    /// Create a new configuration with explicit signing secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry_minutes = minutes;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry_days = days;
        self
    }

    /// Check if using default secrets (security warning)
    pub fn is_using_default_secrets(&self) -> bool {
        self.access_secret == DEV_ACCESS_SECRET || self.refresh_secret == DEV_REFRESH_SECRET
    }
}

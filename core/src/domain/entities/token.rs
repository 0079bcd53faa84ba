//! Token entities for JWT-based session management.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// JWT issuer
pub const JWT_ISSUER: &str = "canter";

/// JWT audience
pub const JWT_AUDIENCE: &str = "canter-api";

/// Discriminates access tokens from refresh tokens inside the JWT payload.
///
/// A refresh token presented where an access token is expected (or vice
/// versa) must be rejected, so the type travels inside the signed claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (rider account ID)
    pub sub: String,

    /// Token family this credential descends from
    pub fam: String,

    /// Whether this is an access or a refresh token
    pub token_type: TokenType,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates new claims for an access token
    pub fn new_access_token(subject_id: Uuid, family_id: &str, expiry_minutes: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(expiry_minutes);

        Self {
            sub: subject_id.to_string(),
            fam: family_id.to_string(),
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Creates new claims for a refresh token
    pub fn new_refresh_token(subject_id: Uuid, family_id: &str, expiry_days: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::days(expiry_days);

        Self {
            sub: subject_id.to_string(),
            fam: family_id.to_string(),
            token_type: TokenType::Refresh,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        now >= self.exp
    }

    /// Gets the subject ID from the claims
    ///
    /// # Returns
    ///
    /// `Ok(Uuid)` if the subject can be parsed as a UUID, `Err` otherwise
    pub fn subject_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Refresh token record stored in the database
///
/// One row per issued refresh token. Rows sharing a `family_id` form a
/// token family: the lineage descended from one login. Within a family at
/// most one row is active at steady state; a second active row may exist
/// briefly while a rotation is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Rider account this token belongs to
    pub subject_id: Uuid,

    /// The literal signed token string (unique)
    pub token: String,

    /// Family this token descends from
    pub family_id: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires (fixed at creation, never extended)
    pub expires_at: DateTime<Utc>,

    /// Whether the token is the current usable token of its family
    pub is_active: bool,

    /// Set only by reuse-triggered family revocation, never by normal
    /// rotation. Implies `is_active == false`.
    pub is_invalidated: bool,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Creates a new active record for a freshly signed refresh token
    pub fn new(subject_id: Uuid, token: String, family_id: String, expiry_days: i64) -> Self {
        let now = Utc::now();
        let expires_at = now + Duration::days(expiry_days);

        Self {
            id: Uuid::new_v4(),
            subject_id,
            token,
            family_id,
            issued_at: now,
            expires_at,
            is_active: true,
            is_invalidated: false,
            created_at: now,
        }
    }

    /// Checks if the record has passed its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Checks if the token is currently usable
    ///
    /// A token is usable if it is active, not invalidated, and not expired.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_invalidated && !self.is_expired()
    }

    /// Retires the record as part of a normal rotation
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Marks the record as revoked by family invalidation
    pub fn invalidate(&mut self) {
        self.is_active = false;
        self.is_invalidated = true;
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Family the refresh token belongs to
    pub token_family: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair with the default expiry windows
    pub fn new(access_token: String, refresh_token: String, token_family: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_family,
            access_expires_in: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
            refresh_expires_in: REFRESH_TOKEN_EXPIRY_DAYS * 24 * 60 * 60,
        }
    }

    /// Creates a new token pair with explicit expiry windows
    pub fn with_expiry(
        access_token: String,
        refresh_token: String,
        token_family: String,
        access_expiry_minutes: i64,
        refresh_expiry_days: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_family,
            access_expires_in: access_expiry_minutes * 60,
            refresh_expires_in: refresh_expiry_days * 24 * 60 * 60,
        }
    }
}

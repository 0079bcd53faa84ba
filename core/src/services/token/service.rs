//! Main token service implementation

use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshTokenRecord, TokenPair, TokenType};
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;
use super::family::generate_token_family;
use super::signer::JwtSigner;

/// Service for issuing, validating, and rotating session token pairs
///
/// The repository is the only shared mutable state; every transition a
/// rotation performs is a conditional write arbitrated by the store, so the
/// service itself holds no locks and can be shared freely across request
/// tasks.
pub struct TokenService<R: TokenRepository> {
    pub(crate) repository: R,
    config: TokenServiceConfig,
    access_signer: JwtSigner,
    pub(crate) refresh_signer: JwtSigner,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for refresh token persistence
    /// * `config` - Token service configuration with the two signing secrets
    pub fn new(repository: R, config: TokenServiceConfig) -> Self {
        let access_signer = JwtSigner::new(&config.access_secret, &config.issuer, &config.audience);
        let refresh_signer =
            JwtSigner::new(&config.refresh_secret, &config.issuer, &config.audience);

        if config.is_using_default_secrets() {
            warn!("token service is running with default development secrets");
        }

        Self {
            repository,
            config,
            access_signer,
            refresh_signer,
        }
    }

    /// Mints a fresh access+refresh pair for a subject
    ///
    /// When `family_id` is `None` a new unguessable family id is generated,
    /// starting a new lineage; passing an existing family id continues that
    /// lineage (rotation does this internally).
    ///
    /// The refresh token is durably recorded before anything is returned.
    /// If the write fails the caller receives no tokens; there is no
    /// unpersisted fallback.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The signed pair plus its family id
    /// * `Err(DomainError)` - Signing or the durable write failed
    pub async fn create_token_pair(
        &self,
        subject_id: Uuid,
        family_id: Option<&str>,
    ) -> Result<TokenPair, DomainError> {
        let family_id = match family_id {
            Some(id) => id.to_string(),
            None => generate_token_family(),
        };

        let access_claims = Claims::new_access_token(
            subject_id,
            &family_id,
            self.config.access_token_expiry_minutes,
        );
        let access_token = self.access_signer.issue(&access_claims)?;

        let refresh_claims = Claims::new_refresh_token(
            subject_id,
            &family_id,
            self.config.refresh_token_expiry_days,
        );
        let refresh_token = self.refresh_signer.issue(&refresh_claims)?;

        let record = RefreshTokenRecord::new(
            subject_id,
            refresh_token.clone(),
            family_id.clone(),
            self.config.refresh_token_expiry_days,
        );
        self.repository.save_token(record).await?;

        Ok(TokenPair::with_expiry(
            access_token,
            refresh_token,
            family_id,
            self.config.access_token_expiry_minutes,
            self.config.refresh_token_expiry_days,
        ))
    }

    /// Verifies an access token and returns its claims
    ///
    /// Access tokens are never persisted, so this is a pure signature and
    /// expiry check against the access signing key.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = self.access_signer.verify(token).map_err(DomainError::Token)?;

        if claims.token_type != TokenType::Access {
            return Err(TokenError::Malformed.into());
        }

        Ok(claims)
    }

    /// Runs the full validation chain on a refresh token
    ///
    /// Checks, in order: signature and structure, expiry from the claims,
    /// the persisted record for the literal token string, and the record's
    /// active state. Never mutates anything.
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The token is valid
    /// * `Err(DomainError::Token(_))` - The failure reason: `Malformed`,
    ///   `BadSignature`, `Expired`, `NotFound`, or `Inactive` (the reuse
    ///   signal)
    pub async fn validate_refresh_token(&self, token: &str) -> Result<Claims, DomainError> {
        let (claims, _record) = self.check_refresh_token(token).await?;
        Ok(claims)
    }

    /// Exchanges a valid refresh token for a new pair, retiring the old one
    ///
    /// Presenting an already-retired token is treated as reuse: the whole
    /// family is invalidated before `ReuseDetected` is returned, since a
    /// retired token resurfacing means either a stale client resubmission
    /// or an attacker holding a stolen token, and neither lineage can be
    /// trusted afterwards.
    ///
    /// Two callers racing with the same valid token are arbitrated by the
    /// store's conditional update; the loser gets `ConcurrentRotation` and
    /// no writes from its attempt survive.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The replacement pair in the same family
    /// * `Err(DomainError::Token(TokenError::ReuseDetected))` - Reuse; the
    ///   family is now invalidated and the subject must log in again
    /// * `Err(DomainError::Token(TokenError::ConcurrentRotation))` - Lost
    ///   the rotation race; the caller holds no new pair
    /// * `Err(DomainError)` - Any validation failure, unchanged and with no
    ///   side effects
    pub async fn rotate_refresh_token(&self, token: &str) -> Result<TokenPair, DomainError> {
        let claims = self.refresh_signer.verify(token).map_err(DomainError::Token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(TokenError::Malformed.into());
        }

        let record = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::Token(TokenError::NotFound))?;

        if record.is_expired() {
            return Err(TokenError::Expired.into());
        }

        if !record.is_active || record.is_invalidated {
            // Reuse of an already-retired token poisons the whole lineage.
            let invalidated = self.invalidate_token_family(&record.family_id).await?;
            warn!(
                family_id = %record.family_id,
                subject_id = %record.subject_id,
                invalidated,
                "retired refresh token presented again; family invalidated"
            );
            return Err(TokenError::ReuseDetected.into());
        }

        let subject_id = claims.subject_id().map_err(|_| TokenError::Malformed)?;
        let family_id = record.family_id.clone();

        let access_claims = Claims::new_access_token(
            subject_id,
            &family_id,
            self.config.access_token_expiry_minutes,
        );
        let access_token = self.access_signer.issue(&access_claims)?;

        let refresh_claims = Claims::new_refresh_token(
            subject_id,
            &family_id,
            self.config.refresh_token_expiry_days,
        );
        let new_refresh_token = self.refresh_signer.issue(&refresh_claims)?;

        let replacement = RefreshTokenRecord::new(
            subject_id,
            new_refresh_token.clone(),
            family_id.clone(),
            self.config.refresh_token_expiry_days,
        );

        // Retire-and-replace commits atomically; zero rows affected on the
        // deactivation means another caller rotated this token first.
        let won = self.repository.rotate_token(token, replacement).await?;
        if !won {
            return Err(TokenError::ConcurrentRotation.into());
        }

        Ok(TokenPair::with_expiry(
            access_token,
            new_refresh_token,
            family_id,
            self.config.access_token_expiry_minutes,
            self.config.refresh_token_expiry_days,
        ))
    }

    /// Revokes every refresh token in a family
    ///
    /// Idempotent: invalidating an already-invalidated or unknown family
    /// affects zero records and is not an error. The subject must
    /// re-authenticate from scratch to regain a session.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of newly invalidated records
    /// * `Err(DomainError)` - Store error occurred
    pub async fn invalidate_token_family(&self, family_id: &str) -> Result<usize, DomainError> {
        let invalidated = self.repository.invalidate_family(family_id).await?;

        if invalidated > 0 {
            warn!(family_id, invalidated, "token family invalidated");
        }

        Ok(invalidated)
    }

    /// Validates a refresh token and returns the claims with the record
    async fn check_refresh_token(
        &self,
        token: &str,
    ) -> Result<(Claims, RefreshTokenRecord), DomainError> {
        let claims = self.refresh_signer.verify(token).map_err(DomainError::Token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(TokenError::Malformed.into());
        }

        let record = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::Token(TokenError::NotFound))?;

        if record.is_expired() {
            return Err(TokenError::Expired.into());
        }

        if !record.is_active || record.is_invalidated {
            return Err(TokenError::Inactive.into());
        }

        Ok((claims, record))
    }
}

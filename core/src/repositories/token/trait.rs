//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for refresh token persistence operations
///
/// The store is the single serialization point for the session layer:
/// every state transition is expressed as a conditional write that the
/// store arbitrates, never as a read-modify-write in application memory.
/// Implementations must report I/O failures as
/// [`TokenError::StoreUnavailable`](crate::errors::TokenError::StoreUnavailable)
/// so callers fail closed.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token record
    ///
    /// The token string is unique-constrained; inserting a duplicate is a
    /// validation error.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError)` - Save failed (duplicate token or store error)
    async fn save_token(&self, record: RefreshTokenRecord)
        -> Result<RefreshTokenRecord, DomainError>;

    /// Find a refresh token record by the literal token string
    ///
    /// # Returns
    /// * `Ok(Some(RefreshTokenRecord))` - Record found
    /// * `Ok(None)` - No record with that token string
    /// * `Err(DomainError)` - Store error occurred
    async fn find_by_token(&self, token: &str)
        -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Find all records belonging to a token family
    ///
    /// # Returns
    /// * `Ok(Vec<RefreshTokenRecord>)` - Every record in the family,
    ///   regardless of state (empty for an unknown family)
    /// * `Err(DomainError)` - Store error occurred
    async fn find_by_family(&self, family_id: &str)
        -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Atomically retire the presented token and insert its replacement
    ///
    /// The deactivation is a conditional update
    /// (`SET is_active = FALSE WHERE token = ? AND is_active = TRUE`); when
    /// it affects zero rows another caller already rotated the token and
    /// nothing is inserted. Both writes commit together or not at all, so a
    /// crash mid-rotation never leaves the family in a half-rotated state.
    ///
    /// # Returns
    /// * `Ok(true)` - This caller won; the replacement is persisted
    /// * `Ok(false)` - Lost the race; no writes took effect
    /// * `Err(DomainError)` - Store error occurred
    async fn rotate_token(
        &self,
        presented: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError>;

    /// Invalidate every record in a token family
    ///
    /// Sets `is_invalidated = TRUE, is_active = FALSE` on all members.
    /// Idempotent: re-invalidating a fully invalidated or unknown family
    /// affects zero rows and is not an error.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of newly affected records
    /// * `Err(DomainError)` - Store error occurred
    async fn invalidate_family(&self, family_id: &str) -> Result<usize, DomainError>;

    /// Delete records whose `expires_at` has passed
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    /// * `Err(DomainError)` - Deletion failed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Delete invalidated records created before the cutoff
    ///
    /// Invalidated records are kept for a grace period for audit before
    /// this removes them. Records that are merely inactive (normal
    /// rotation) are left to age out via `delete_expired`.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    /// * `Err(DomainError)` - Deletion failed
    async fn delete_invalidated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Check if a token exists and is currently usable
    async fn is_token_usable(&self, token: &str) -> Result<bool, DomainError> {
        match self.find_by_token(token).await? {
            Some(record) => Ok(record.is_usable()),
            None => Ok(false),
        }
    }

    /// Count all records in a family
    async fn count_family_tokens(&self, family_id: &str) -> Result<usize, DomainError> {
        let records = self.find_by_family(family_id).await?;
        Ok(records.len())
    }
}

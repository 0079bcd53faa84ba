//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Mock token repository for testing
///
/// Backed by a `HashMap` keyed by the token string. The write lock plays
/// the role of the database transaction: `rotate_token` and
/// `invalidate_family` perform their check-and-write under a single lock
/// acquisition, so racing callers observe the same arbitration a
/// conditional SQL update would give them.
pub struct MockTokenRepository {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of records currently held, regardless of state
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the repository holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.token) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        records.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(token).cloned())
    }

    async fn find_by_family(
        &self,
        family_id: &str,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.family_id == family_id)
            .cloned()
            .collect())
    }

    async fn rotate_token(
        &self,
        presented: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&replacement.token) {
            return Err(DomainError::Validation {
                message: "Replacement token already exists".to_string(),
            });
        }

        // Conditional update: only the caller that finds the presented
        // record still active wins the rotation.
        match records.get_mut(presented) {
            Some(record) if record.is_active => record.deactivate(),
            _ => return Ok(false),
        }

        records.insert(replacement.token.clone(), replacement);
        Ok(true)
    }

    async fn invalidate_family(&self, family_id: &str) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for record in records.values_mut() {
            if record.family_id == family_id && !record.is_invalidated {
                record.invalidate();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| record.expires_at >= now);

        Ok(initial_count - records.len())
    }

    async fn delete_invalidated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| !(record.is_invalidated && record.created_at < cutoff));

        Ok(initial_count - records.len())
    }
}

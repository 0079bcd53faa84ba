//! MySQL implementation of the TokenRepository trait.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE refresh_tokens (
//!     id             CHAR(36)     NOT NULL PRIMARY KEY,
//!     subject_id     CHAR(36)     NOT NULL,
//!     token          VARCHAR(768) NOT NULL UNIQUE,
//!     family_id      VARCHAR(64)  NOT NULL,
//!     issued_at      TIMESTAMP(3) NOT NULL,
//!     expires_at     TIMESTAMP(3) NOT NULL,
//!     is_active      BOOLEAN      NOT NULL DEFAULT TRUE,
//!     is_invalidated BOOLEAN      NOT NULL DEFAULT FALSE,
//!     created_at     TIMESTAMP(3) NOT NULL,
//!     INDEX idx_refresh_tokens_family (family_id),
//!     INDEX idx_refresh_tokens_expires (expires_at)
//! );
//! ```
//!
//! The database arbitrates every state transition: rotation is a
//! conditional `UPDATE` plus `INSERT` inside one transaction, and family
//! invalidation is a single conditional `UPDATE`. The application never
//! does read-modify-write on token state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use canter_core::domain::entities::token::RefreshTokenRecord;
use canter_core::errors::{DomainError, TokenError};
use canter_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Map a store I/O failure so callers fail closed
    fn store_error(e: sqlx::Error) -> DomainError {
        tracing::error!("token store unavailable: {}", e);
        DomainError::Token(TokenError::StoreUnavailable)
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;

        let subject_id: String = row.try_get("subject_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get subject_id: {}", e),
        })?;

        Ok(RefreshTokenRecord {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid record UUID: {}", e),
            })?,
            subject_id: Uuid::parse_str(&subject_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid subject UUID: {}", e),
            })?,
            token: row.try_get("token").map_err(|e| DomainError::Internal {
                message: format!("Failed to get token: {}", e),
            })?,
            family_id: row.try_get("family_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get family_id: {}", e),
            })?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get issued_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            is_active: row.try_get("is_active").map_err(|e| DomainError::Internal {
                message: format!("Failed to get is_active: {}", e),
            })?,
            is_invalidated: row
                .try_get("is_invalidated")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get is_invalidated: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, subject_id, token, family_id, issued_at, expires_at, \
                              is_active, is_invalidated, created_at";

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, subject_id, token, family_id, issued_at, expires_at,
                is_active, is_invalidated, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.subject_id.to_string())
            .bind(&record.token)
            .bind(&record.family_id)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .bind(record.is_active)
            .bind(record.is_invalidated)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => DomainError::Validation {
                    message: "Token already exists".to_string(),
                },
                _ => Self::store_error(e),
            })?;

        Ok(record)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token = ? LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::store_error)?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_family(
        &self,
        family_id: &str,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE family_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(family_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::store_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(Self::row_to_record(&row)?);
        }

        Ok(records)
    }

    async fn rotate_token(
        &self,
        presented: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(Self::store_error)?;

        // Conditional retire. Zero rows affected means another caller
        // rotated this token first; nothing is inserted in that case.
        let retired = sqlx::query(
            "UPDATE refresh_tokens SET is_active = FALSE WHERE token = ? AND is_active = TRUE",
        )
        .bind(presented)
        .execute(&mut *tx)
        .await
        .map_err(Self::store_error)?;

        if retired.rows_affected() == 0 {
            tx.rollback().await.map_err(Self::store_error)?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                id, subject_id, token, family_id, issued_at, expires_at,
                is_active, is_invalidated, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(replacement.id.to_string())
        .bind(replacement.subject_id.to_string())
        .bind(&replacement.token)
        .bind(&replacement.family_id)
        .bind(replacement.issued_at)
        .bind(replacement.expires_at)
        .bind(replacement.is_active)
        .bind(replacement.is_invalidated)
        .bind(replacement.created_at)
        .execute(&mut *tx)
        .await
        .map_err(Self::store_error)?;

        tx.commit().await.map_err(Self::store_error)?;
        Ok(true)
    }

    async fn invalidate_family(&self, family_id: &str) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_invalidated = TRUE, is_active = FALSE
            WHERE family_id = ? AND is_invalidated = FALSE
            "#,
        )
        .bind(family_id)
        .execute(&self.pool)
        .await
        .map_err(Self::store_error)?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(Self::store_error)?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_invalidated_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE is_invalidated = TRUE AND created_at < ?",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(Self::store_error)?;

        Ok(result.rows_affected() as usize)
    }
}

//! Unit tests for the mock token repository implementation

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::repositories::token::{MockTokenRepository, TokenRepository};

fn record(token: &str, family: &str) -> RefreshTokenRecord {
    RefreshTokenRecord::new(
        Uuid::new_v4(),
        token.to_string(),
        family.to_string(),
        7,
    )
}

#[tokio::test]
async fn test_save_and_find_token() {
    let repo = MockTokenRepository::new();
    let saved = repo.save_token(record("token-a", "fam-1")).await.unwrap();

    let found = repo.find_by_token("token-a").await.unwrap();
    assert!(found.is_some());

    let found = found.unwrap();
    assert_eq!(found.id, saved.id);
    assert_eq!(found.family_id, "fam-1");
    assert!(found.is_usable());
}

#[tokio::test]
async fn test_duplicate_token_rejected() {
    let repo = MockTokenRepository::new();

    repo.save_token(record("same-token", "fam-1")).await.unwrap();
    let result = repo.save_token(record("same-token", "fam-2")).await;

    assert!(result.is_err());
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_find_by_family() {
    let repo = MockTokenRepository::new();
    repo.save_token(record("t1", "fam-1")).await.unwrap();
    repo.save_token(record("t2", "fam-1")).await.unwrap();
    repo.save_token(record("t3", "fam-2")).await.unwrap();

    let members = repo.find_by_family("fam-1").await.unwrap();
    assert_eq!(members.len(), 2);

    let none = repo.find_by_family("unknown").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_rotate_token_wins_once() {
    let repo = MockTokenRepository::new();
    repo.save_token(record("old", "fam-1")).await.unwrap();

    let won = repo.rotate_token("old", record("new", "fam-1")).await.unwrap();
    assert!(won);

    // Second rotation of the same token loses the conditional update.
    let won_again = repo.rotate_token("old", record("newer", "fam-1")).await.unwrap();
    assert!(!won_again);

    let old = repo.find_by_token("old").await.unwrap().unwrap();
    assert!(!old.is_active);
    assert!(!old.is_invalidated);

    let new = repo.find_by_token("new").await.unwrap().unwrap();
    assert!(new.is_active);

    // The losing branch must not have inserted its replacement.
    assert!(repo.find_by_token("newer").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rotate_unknown_token_loses() {
    let repo = MockTokenRepository::new();

    let won = repo.rotate_token("missing", record("new", "fam-1")).await.unwrap();
    assert!(!won);
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_invalidate_family_is_idempotent() {
    let repo = MockTokenRepository::new();
    repo.save_token(record("t1", "fam-1")).await.unwrap();
    repo.save_token(record("t2", "fam-1")).await.unwrap();
    repo.save_token(record("t3", "fam-2")).await.unwrap();

    let first = repo.invalidate_family("fam-1").await.unwrap();
    assert_eq!(first, 2);

    let second = repo.invalidate_family("fam-1").await.unwrap();
    assert_eq!(second, 0);

    let unknown = repo.invalidate_family("no-such-family").await.unwrap();
    assert_eq!(unknown, 0);

    let untouched = repo.find_by_token("t3").await.unwrap().unwrap();
    assert!(untouched.is_active);
}

#[tokio::test]
async fn test_delete_expired() {
    let repo = MockTokenRepository::new();

    let mut expired = record("expired", "fam-1");
    expired.expires_at = Utc::now() - Duration::days(1);
    repo.save_token(expired).await.unwrap();
    repo.save_token(record("live", "fam-1")).await.unwrap();

    let deleted = repo.delete_expired(Utc::now()).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(repo.find_by_token("expired").await.unwrap().is_none());
    assert!(repo.find_by_token("live").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_invalidated_before_cutoff() {
    let repo = MockTokenRepository::new();

    let mut old_invalidated = record("old-invalidated", "fam-1");
    old_invalidated.invalidate();
    old_invalidated.created_at = Utc::now() - Duration::days(10);
    repo.save_token(old_invalidated).await.unwrap();

    let mut fresh_invalidated = record("fresh-invalidated", "fam-1");
    fresh_invalidated.invalidate();
    repo.save_token(fresh_invalidated).await.unwrap();

    let cutoff = Utc::now() - Duration::days(7);
    let deleted = repo.delete_invalidated_before(cutoff).await.unwrap();

    assert_eq!(deleted, 1);
    assert!(repo.find_by_token("old-invalidated").await.unwrap().is_none());
    // Still within the audit grace period.
    assert!(repo.find_by_token("fresh-invalidated").await.unwrap().is_some());
}

#[tokio::test]
async fn test_is_token_usable_helper() {
    let repo = MockTokenRepository::new();
    repo.save_token(record("usable", "fam-1")).await.unwrap();

    assert!(repo.is_token_usable("usable").await.unwrap());
    assert!(!repo.is_token_usable("missing").await.unwrap());

    repo.invalidate_family("fam-1").await.unwrap();
    assert!(!repo.is_token_usable("usable").await.unwrap());
}

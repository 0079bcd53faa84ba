//! Unit tests for token pair issuance and validation

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, RefreshTokenRecord, TokenType};
use crate::errors::TokenError;
use crate::repositories::{MockTokenRepository, TokenRepository};
use crate::services::token::{TokenService, TokenServiceConfig};

use super::mocks::FailingTokenRepository;

fn create_test_service() -> TokenService<MockTokenRepository> {
    TokenService::new(MockTokenRepository::new(), TokenServiceConfig::default())
}

fn token_error(
    result: Result<impl std::fmt::Debug, crate::errors::DomainError>,
) -> TokenError {
    result
        .unwrap_err()
        .as_token_error()
        .expect("expected a token error")
}

#[tokio::test]
async fn test_create_token_pair_round_trip() {
    let service = create_test_service();
    let subject_id = Uuid::new_v4();

    let pair = service.create_token_pair(subject_id, None).await.unwrap();

    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert_eq!(pair.access_expires_in, 15 * 60);
    assert_eq!(pair.refresh_expires_in, 7 * 24 * 60 * 60);

    // Both tokens independently pass verification with matching claims.
    let access_claims = service.verify_access_token(&pair.access_token).unwrap();
    assert_eq!(access_claims.subject_id().unwrap(), subject_id);
    assert_eq!(access_claims.fam, pair.token_family);
    assert_eq!(access_claims.token_type, TokenType::Access);

    let refresh_claims = service
        .validate_refresh_token(&pair.refresh_token)
        .await
        .unwrap();
    assert_eq!(refresh_claims.subject_id().unwrap(), subject_id);
    assert_eq!(refresh_claims.fam, pair.token_family);
    assert_eq!(refresh_claims.token_type, TokenType::Refresh);
}

#[tokio::test]
async fn test_create_token_pair_generates_family() {
    let service = create_test_service();

    let pair = service
        .create_token_pair(Uuid::new_v4(), None)
        .await
        .unwrap();

    assert_eq!(pair.token_family.len(), 32);
    assert!(pair
        .token_family
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[tokio::test]
async fn test_create_token_pair_continues_family() {
    let service = create_test_service();

    let pair = service
        .create_token_pair(Uuid::new_v4(), Some("existing-family"))
        .await
        .unwrap();

    assert_eq!(pair.token_family, "existing-family");

    let claims = service
        .validate_refresh_token(&pair.refresh_token)
        .await
        .unwrap();
    assert_eq!(claims.fam, "existing-family");
}

#[tokio::test]
async fn test_create_token_pair_persists_active_record() {
    let service = create_test_service();
    let subject_id = Uuid::new_v4();

    let pair = service.create_token_pair(subject_id, None).await.unwrap();

    let record = service
        .repository
        .find_by_token(&pair.refresh_token)
        .await
        .unwrap()
        .expect("record should be persisted");

    assert_eq!(record.subject_id, subject_id);
    assert_eq!(record.family_id, pair.token_family);
    assert!(record.is_active);
    assert!(!record.is_invalidated);
}

#[tokio::test]
async fn test_issuance_fails_closed_when_store_is_down() {
    let service = TokenService::new(FailingTokenRepository, TokenServiceConfig::default());

    let result = service.create_token_pair(Uuid::new_v4(), None).await;

    assert_eq!(token_error(result), TokenError::StoreUnavailable);
}

#[tokio::test]
async fn test_validate_rejects_garbage() {
    let service = create_test_service();

    let result = service.validate_refresh_token("definitely-not-a-jwt").await;

    assert_eq!(token_error(result), TokenError::Malformed);
}

#[tokio::test]
async fn test_validate_rejects_foreign_signature() {
    let service = create_test_service();
    let other = TokenService::new(
        MockTokenRepository::new(),
        TokenServiceConfig::new("other-access-secret", "other-refresh-secret"),
    );

    let pair = other.create_token_pair(Uuid::new_v4(), None).await.unwrap();

    let result = service.validate_refresh_token(&pair.refresh_token).await;
    assert_eq!(token_error(result), TokenError::BadSignature);
}

#[tokio::test]
async fn test_validate_rejects_access_token_as_refresh() {
    let service = create_test_service();

    // Access tokens are signed with the independent access key, so they
    // fail refresh verification at the signature step already.
    let pair = service
        .create_token_pair(Uuid::new_v4(), None)
        .await
        .unwrap();
    let result = service.validate_refresh_token(&pair.access_token).await;
    assert_eq!(token_error(result), TokenError::BadSignature);

    // Even a token carrying the refresh signature is rejected when its
    // embedded type is not `refresh`.
    let wrong_type = Claims::new_access_token(Uuid::new_v4(), "fam", 15);
    let signed = service.refresh_signer.issue(&wrong_type).unwrap();
    let result = service.validate_refresh_token(&signed).await;
    assert_eq!(token_error(result), TokenError::Malformed);
}

#[tokio::test]
async fn test_validate_unknown_token_is_not_found() {
    let service = create_test_service();

    // Properly signed, but no record in the store (e.g. a token from a
    // wiped environment). Invalid, but never treated as reuse.
    let claims = Claims::new_refresh_token(Uuid::new_v4(), "orphan-family", 7);
    let signed = service.refresh_signer.issue(&claims).unwrap();

    let result = service.validate_refresh_token(&signed).await;
    assert_eq!(token_error(result), TokenError::NotFound);
}

#[tokio::test]
async fn test_validate_expired_claims() {
    let service = create_test_service();

    let mut claims = Claims::new_refresh_token(Uuid::new_v4(), "fam", 7);
    claims.exp = Utc::now().timestamp() - 1;
    let signed = service.refresh_signer.issue(&claims).unwrap();

    let result = service.validate_refresh_token(&signed).await;
    assert_eq!(token_error(result), TokenError::Expired);
}

#[tokio::test]
async fn test_validate_expiry_boundary() {
    let service = create_test_service();
    let subject_id = Uuid::new_v4();

    // Just inside the expiry window: passes.
    let mut claims = Claims::new_refresh_token(subject_id, "fam", 7);
    claims.exp = Utc::now().timestamp() + 5;
    let signed = service.refresh_signer.issue(&claims).unwrap();

    let mut record =
        RefreshTokenRecord::new(subject_id, signed.clone(), "fam".to_string(), 7);
    record.expires_at = Utc::now() + Duration::seconds(5);
    service.repository.save_token(record).await.unwrap();

    assert!(service.validate_refresh_token(&signed).await.is_ok());
}

#[tokio::test]
async fn test_validate_expired_record() {
    let service = create_test_service();
    let subject_id = Uuid::new_v4();

    // Claims still valid, but the persisted record has passed its expiry.
    let claims = Claims::new_refresh_token(subject_id, "fam", 7);
    let signed = service.refresh_signer.issue(&claims).unwrap();

    let mut record =
        RefreshTokenRecord::new(subject_id, signed.clone(), "fam".to_string(), 7);
    record.expires_at = Utc::now() - Duration::milliseconds(1);
    service.repository.save_token(record).await.unwrap();

    let result = service.validate_refresh_token(&signed).await;
    assert_eq!(token_error(result), TokenError::Expired);
}

#[tokio::test]
async fn test_validate_never_mutates_state() {
    let service = create_test_service();
    let pair = service
        .create_token_pair(Uuid::new_v4(), None)
        .await
        .unwrap();

    for _ in 0..3 {
        service
            .validate_refresh_token(&pair.refresh_token)
            .await
            .unwrap();
    }

    let record = service
        .repository
        .find_by_token(&pair.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_active);
    assert_eq!(service.repository.len().await, 1);
}

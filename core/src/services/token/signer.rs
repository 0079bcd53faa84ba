//! JWT signing and verification
//!
//! [`JwtSigner`] is a pure function over a signing secret: it owns no
//! persisted state and never touches the repository. The token service
//! holds two of them, one per secret, so access tokens cannot be verified
//! against the refresh key or vice versa.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};

/// HS256 signer/verifier for one signing secret
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSigner {
    /// Creates a signer from a symmetric secret
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // The expiry boundary is exact; no clock-skew allowance.
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Encodes claims into a signed JWT
    ///
    /// Fails only when the claims cannot be serialized.
    pub fn issue(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode claims: {}", e),
        })
    }

    /// Verifies a signed JWT and returns the claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The decoded claims if valid
    /// * `Err(TokenError::Expired)` - The token is past its expiry
    /// * `Err(TokenError::BadSignature)` - The signature does not match
    /// * `Err(TokenError::Malformed)` - The token does not parse into the
    ///   expected shape
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                    _ => TokenError::Malformed,
                }
            })?;

        Ok(token_data.claims)
    }
}

//! HS256 bearer token issue/verify.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    /// The token could not be decoded or its signature did not verify.
    #[error("malformed or unverifiable token")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    /// The token decoded but its claims are outside their validity window.
    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    /// Token issuance failed (serialization/signing).
    #[error("token issuance failed")]
    Issue(#[source] jsonwebtoken::errors::Error),
}

/// Verifies a bearer token and yields its claims.
///
/// Kept as a trait so the HTTP layer can hold `Arc<dyn JwtValidator>` and
/// tests can substitute a stub.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HS256 (shared-secret) token codec.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry lives in our own `expires_at` claim (RFC 3339), checked by
        // `validate_claims`; the registered `exp` claim is not used.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a set of claims into a compact token.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(TokenError::Issue)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Malformed)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountKind;
    use chrono::Duration;
    use pasar_core::UserId;

    fn fresh_claims() -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            kind: AccountKind::Seller,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let claims = fresh_claims();
        let token = jwt.issue(&claims).unwrap();

        let decoded = jwt.validate(&token, Utc::now()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = Hs256Jwt::new(b"secret-a");
        let verifier = Hs256Jwt::new(b"secret-b");
        let token = issuer.issue(&fresh_claims()).unwrap();

        assert!(matches!(
            verifier.validate(&token, Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let now = Utc::now();
        let claims = JwtClaims {
            sub: UserId::new(),
            kind: AccountKind::Buyer,
            issued_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
        };
        let token = jwt.issue(&claims).unwrap();

        assert!(matches!(
            jwt.validate(&token, now),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = Hs256Jwt::new(b"test-secret");
        assert!(matches!(
            jwt.validate("not.a.token", Utc::now()),
            Err(TokenError::Malformed(_))
        ));
    }
}

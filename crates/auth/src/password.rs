//! Password hashing and verification.

use thiserror::Error;

/// bcrypt work factor. Matches the cost the rest of the platform's tooling
/// expects for these credentials.
const COST: u32 = 10;

#[derive(Debug, Error)]
#[error("credential hashing failed")]
pub struct PasswordError(#[source] bcrypt::BcryptError);

/// Hash a plaintext password for storage.
pub fn hash(plaintext: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, COST).map_err(PasswordError)
}

/// Verify a plaintext password against a stored hash.
///
/// A malformed stored hash verifies as `false` rather than erroring: from the
/// caller's point of view the credential simply does not match.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

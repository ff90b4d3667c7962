//! Credential hashing and verification

use crate::error::AuthError;

/// Fixed bcrypt cost factor. Raising it only affects newly stored hashes;
/// verification reads the cost embedded in each hash string.
pub const HASH_COST: u32 = 12;

/// Hash a plaintext password with a fresh random salt.
///
/// Fails only when the entropy source cannot produce a salt.
pub fn hash(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| AuthError::Internal(e.to_string()))
}

/// Verify a plaintext password against a stored hash in constant time.
///
/// A malformed hash string verifies as `false` rather than erroring, so a
/// corrupted row denies access instead of failing the request.
pub fn verify(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Bcrypt failure: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

/// Hash a plaintext password with a fresh random salt at the given bcrypt cost
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, cost).map_err(PasswordError::from)
}

/// Verify a password against a bcrypt hash
/// Uses constant-time comparison to prevent timing attacks
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, hash).map_err(PasswordError::from)
}

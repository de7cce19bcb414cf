//! Authentication module
//!
//! Session tokens are opaque random strings stored on the user row. A valid
//! token resolves to the user's id, which is all the rest of the server needs.

pub mod accounts;

use rand::Rng;
use sha2::{Digest, Sha256};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Salted SHA-256 password digest as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

impl PasswordHash {
    /// Hash a password under a fresh random salt
    pub fn new(password: &str) -> Self {
        let salt_bytes: [u8; 16] = rand::rng().random();
        let salt = hex::encode(salt_bytes);
        let hash = digest(password, &salt);
        Self { salt, hash }
    }

    /// Rebuild from stored columns
    pub fn from_parts(salt: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            hash: hash.into(),
        }
    }

    /// Check a candidate password
    pub fn verify(&self, password: &str) -> bool {
        digest(password, &self.salt) == self.hash
    }
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a session token (64 hex chars)
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    hex::encode(hasher.finalize())
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token1 = generate_token();
        let token2 = generate_token();

        assert_eq!(token1.len(), 64);
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_password_roundtrip() {
        let stored = PasswordHash::new("mysecret");
        assert_eq!(stored.salt.len(), 32);
        assert!(stored.verify("mysecret"));
        assert!(!stored.verify("wrongpassword"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = PasswordHash::new("secret123");
        let b = PasswordHash::new("secret123");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_from_parts_verifies() {
        let stored = PasswordHash::new("hunter22");
        let loaded = PasswordHash::from_parts(stored.salt.clone(), stored.hash.clone());
        assert!(loaded.verify("hunter22"));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
    }
}

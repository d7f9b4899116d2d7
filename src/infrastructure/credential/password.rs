//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Output of hashing a password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    /// PHC string (algorithm, parameters, salt and hash)
    pub hash: String,
    /// Salt the hash was derived with
    pub salt: String,
}

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a freshly generated salt
    fn hash(&self, password: &str) -> Result<PasswordDigest, DomainError>;

    /// Verify a password against a PHC hash string
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hasher with the crate's default parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(PasswordDigest {
            hash: hash.to_string(),
            salt: salt.as_str().to_string(),
        })
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();

        let digest = hasher.hash("my_secure_password").unwrap();

        assert!(digest.hash.starts_with("$argon2id$"));
        assert!(hasher.verify("my_secure_password", &digest.hash));
        assert!(!hasher.verify("wrong_password", &digest.hash));
    }

    #[test]
    fn test_salt_is_embedded_in_hash() {
        let hasher = Argon2Hasher::new();

        let digest = hasher.hash("my_secure_password").unwrap();
        assert!(digest.hash.contains(&digest.salt));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = Argon2Hasher::new();

        let first = hasher.hash("same_password").unwrap();
        let second = hasher.hash("same_password").unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
        assert!(hasher.verify("same_password", &first.hash));
        assert!(hasher.verify("same_password", &second.hash));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = Argon2Hasher::new();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", ""));
    }
}

//! Password hashing utilities using bcrypt and Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Algorithm used for new password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    #[default]
    Bcrypt,
    Argon2,
}

/// bcrypt-based password hasher
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a bcrypt hasher with the given work factor
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
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

/// Hashes with the configured algorithm, verifies with whichever algorithm
/// produced the stored hash
#[derive(Debug, Clone)]
pub struct DelegatingHasher {
    algorithm: PasswordAlgorithm,
    bcrypt: BcryptHasher,
    argon2: Argon2Hasher,
}

impl DelegatingHasher {
    pub fn new(algorithm: PasswordAlgorithm, bcrypt_cost: u32) -> Self {
        Self {
            algorithm,
            bcrypt: BcryptHasher::new(bcrypt_cost),
            argon2: Argon2Hasher::new(),
        }
    }
}

impl PasswordHasher for DelegatingHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        match self.algorithm {
            PasswordAlgorithm::Bcrypt => self.bcrypt.hash(password),
            PasswordAlgorithm::Argon2 => self.argon2.hash(password),
        }
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        if hash.starts_with("$argon2") {
            self.argon2.verify(password, hash)
        } else if hash.starts_with("$2") {
            self.bcrypt.verify(password, hash)
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_bcrypt() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = fast_bcrypt();
        let hash = hasher.hash("my_secure_password").unwrap();

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("my_secure_password", &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = fast_bcrypt();

        let hash1 = hasher.hash("same").unwrap();
        let hash2 = hasher.hash("same").unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same", &hash1));
        assert!(hasher.verify("same", &hash2));
    }

    #[test]
    fn test_verify_invalid_hash() {
        assert!(!fast_bcrypt().verify("password", "invalid_hash_format"));
        assert!(!Argon2Hasher::new().verify("password", ""));
    }

    #[test]
    fn test_delegating_hasher_verifies_both_algorithms() {
        let bcrypt_first = DelegatingHasher::new(PasswordAlgorithm::Bcrypt, 4);
        let argon_first = DelegatingHasher::new(PasswordAlgorithm::Argon2, 4);

        let bcrypt_hash = bcrypt_first.hash("pw").unwrap();
        let argon_hash = argon_first.hash("pw").unwrap();

        assert!(bcrypt_hash.starts_with("$2"));
        assert!(argon_hash.starts_with("$argon2"));
        assert!(bcrypt_first.verify("pw", &argon_hash));
        assert!(argon_first.verify("pw", &bcrypt_hash));
        assert!(!bcrypt_first.verify("pw", "plaintext"));
    }
}

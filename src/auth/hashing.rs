//! Password hashing
//!
//! Salted Argon2id hashes stored in PHC string format. Verification reads the
//! cost parameters back out of the stored hash, so changing the configured
//! cost only affects newly registered users.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use log::warn;

use crate::config::AuthConfig;
use crate::error::CredentialError;

/// Hashes and verifies passwords with a fixed Argon2id cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Build a hasher from explicit Argon2 cost parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, CredentialError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Check a password against a stored PHC hash.
    ///
    /// A stored value that does not parse is treated as a mismatch.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(e) => {
                warn!("Password verification error: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(8, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let hasher = fast_hasher();
        let first = hasher.hash("pw1").unwrap();
        let second = hasher.hash("pw1").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("pw1", &first));
        assert!(hasher.verify("pw1", &second));
        assert!(!hasher.verify("pw2", &first));
    }

    #[test]
    fn verify_uses_params_from_stored_hash() {
        let stored = CredentialHasher::new(16, 2, 1).unwrap().hash("secret").unwrap();
        assert!(fast_hasher().verify("secret", &stored));
    }

    #[test]
    fn garbage_hash_never_matches() {
        assert!(!fast_hasher().verify("anything", "plaintext-password"));
        assert!(!fast_hasher().verify("", ""));
    }

    #[test]
    fn rejects_invalid_cost() {
        assert!(CredentialHasher::new(0, 0, 0).is_err());
    }
}

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("hashing failed: {0}")]
    Hash(String),
    #[error("stored hash is malformed: {0}")]
    MalformedHash(String),
}

/// Argon2id hashing with a random salt per password, stored as a PHC string.
///
/// Also holds a hash of a random password so that sign-in for an unknown
/// email verifies against something and costs the same as a wrong password.
#[derive(Clone)]
pub struct PasswordHashing {
    params: Params,
    dummy_hash: String,
}

impl PasswordHashing {
    pub fn new(params: Params) -> Result<Self, PasswordError> {
        let mut hashing = Self {
            params,
            dummy_hash: String::new(),
        };
        let dummy_password = uuid::Uuid::new_v4().to_string();
        hashing.dummy_hash = hashing.hash(&dummy_password)?;
        Ok(hashing)
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| PasswordError::Params(e.to_string()))?;
        Self::new(params)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify against a stored PHC string. Cost parameters come from the
    /// stored hash, so older hashes keep verifying after a config change.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn one verification for an unknown account. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}

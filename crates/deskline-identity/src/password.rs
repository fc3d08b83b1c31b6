// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`), so verification reads
//! the parameters back out of the stored hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use deskline_config::model::IdentityConfig;
use deskline_core::DesklineError;

/// Argon2id hasher configured from `[identity]`.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(memory_cost: u32, iterations: u32, parallelism: u32) -> Result<Self, DesklineError> {
        let params = Params::new(memory_cost, iterations, parallelism, None)
            .map_err(|e| DesklineError::Config(format!("invalid Argon2id parameters: {e}")))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self, DesklineError> {
        Self::new(
            config.hash_memory_cost,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    /// Hash `plaintext` with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, DesklineError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DesklineError::Internal(format!("password hashing failed: {e}")))
    }

    /// Hash on the blocking pool so the request task is not stalled.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, DesklineError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| DesklineError::Internal(format!("hashing task failed: {e}")))?
    }

    /// Whether `plaintext` matches the stored PHC `hash`. Malformed hashes never match.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

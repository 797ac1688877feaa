//! Password hashing and API key generation.
//!
//! Passwords are stored as Argon2id PHC strings. Each hash carries its own salt
//! and parameters, so verification keeps working after the configured cost
//! changes.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::config::SecurityConfig;

/// Number of random bytes drawn for each API key.
pub const API_KEY_ENTROPY_BYTES: usize = 32;

/// Argon2id hasher configured from [`SecurityConfig`].
#[derive(Debug, Clone)]
pub struct SecureHasher {
    params: Params,
}

impl SecureHasher {
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        Ok(Self { params })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn secure_hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Check a plaintext against a stored PHC hash.
    ///
    /// The digest comparison is constant-time. A hash that fails to parse
    /// never matches.
    #[must_use]
    pub fn verify(&self, plaintext: &str, password_hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
            return false;
        };

        // Parameters come from the hash itself
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Generate a random alphanumeric API key.
///
/// 32 random bytes are base64-encoded and every non-alphanumeric character is
/// dropped, which leaves roughly 40 to 43 characters.
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; API_KEY_ENTROPY_BYTES] = rng.random();

    STANDARD
        .encode(bytes)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

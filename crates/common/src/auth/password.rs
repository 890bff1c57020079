//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`), which carry
//! their own salt and parameters, so a credential hashed under an older
//! cost still verifies after the configured cost changes.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Size of the random salt generated for every credential
pub const SALT_SIZE: usize = 16;

/// Tunable Argon2id work factor.
///
/// The default sits in the same latency range as bcrypt at cost 10
/// on commodity hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// The cheapest cost argon2 accepts. Only suitable for tests.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hash cost: {0}")]
    InvalidCost(String),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Hashes and verifies passwords off the async executor.
///
/// Holds a pre-computed decoy hash so that verifying an unknown
/// username costs the same as verifying a known one.
#[derive(Clone)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
    decoy: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon.params())
            .finish()
    }
}

fn salt() -> Result<SaltString, PasswordError> {
    let mut bytes = [0u8; SALT_SIZE];
    rand::rng().fill(&mut bytes);
    SaltString::encode_b64(&bytes).map_err(|e| PasswordError::Hash(e.to_string()))
}

fn hash_with(argon: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    argon
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

fn verify_with(argon: &Argon2<'_>, password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| argon.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut decoy_secret = [0u8; 32];
        rand::rng().fill(&mut decoy_secret);
        let decoy = hash_with(&argon, &hex::encode(decoy_secret))?;

        Ok(Self {
            argon,
            decoy: decoy.into(),
        })
    }

    /// Hash a password with a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon = self.argon.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_with(&argon, &password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Check a password against a stored PHC hash.
    ///
    /// Unparseable hashes verify as false.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        let argon = self.argon.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        match tokio::task::spawn_blocking(move || verify_with(&argon, &password, &hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("password verification task failed: {}", e);
                false
            }
        }
    }

    /// Burn the same work as a real verification, always yielding false.
    pub async fn verify_decoy(&self, password: &str) -> bool {
        let decoy = self.decoy.clone();
        let _ = self.verify(password, &decoy).await;
        false
    }
}

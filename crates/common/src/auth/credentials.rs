use std::fmt::{Debug, Display};

use async_trait::async_trait;

use super::password::{PasswordError, PasswordHasher};

#[derive(thiserror::Error, Debug)]
pub enum CredentialError<T> {
    #[error("unhandled credential provider error: {0}")]
    Provider(#[from] T),
    /// A credential already exists for the username
    #[error("username already taken: {0}")]
    Conflict(String),
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error(transparent)]
    Password(PasswordError),
}

/// Persistence for username -> password hash pairs.
///
/// Usernames are compared case-sensitively. Implementations never
/// see plaintext passwords.
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Atomically insert a credential unless one already exists.
    ///
    /// # Returns
    /// * `Ok(true)` - the credential was stored
    /// * `Ok(false)` - the username was already present; nothing changed
    async fn insert(&self, username: &str, password_hash: &str) -> Result<bool, Self::Error>;

    /// Fetch the stored hash for a username, if any
    async fn password_hash(&self, username: &str) -> Result<Option<String>, Self::Error>;
}

/// Registration and password verification over a [`CredentialProvider`].
#[derive(Debug, Clone)]
pub struct CredentialStore<P> {
    provider: P,
    hasher: PasswordHasher,
}

impl<P: CredentialProvider> CredentialStore<P> {
    pub fn new(provider: P, hasher: PasswordHasher) -> Self {
        Self { provider, hasher }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Register a new credential.
    ///
    /// The hash is computed before the uniqueness check so that a taken
    /// username costs the same as a fresh one; the insert itself decides
    /// the conflict.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), CredentialError<P::Error>> {
        if username.is_empty() {
            return Err(CredentialError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }

        let hash = self
            .hasher
            .hash(password)
            .await
            .map_err(CredentialError::Password)?;
        if !self.provider.insert(username, &hash).await? {
            tracing::debug!(username, "registration rejected, username taken");
            return Err(CredentialError::Conflict(username.to_string()));
        }

        tracing::info!(username, "registered credential");
        Ok(())
    }

    /// Verify a username/password pair. Never errors.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        match self.provider.password_hash(username).await {
            Ok(Some(hash)) => self.hasher.verify(password, &hash).await,
            Ok(None) => self.hasher.verify_decoy(password).await,
            Err(e) => {
                tracing::error!(username, "failed to look up credential: {}", e);
                self.hasher.verify_decoy(password).await
            }
        }
    }
}

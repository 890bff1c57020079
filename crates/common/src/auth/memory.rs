use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::credentials::CredentialProvider;

/// In-memory credential provider
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialProvider {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryCredentialProviderError {
    #[error("memory provider error: {0}")]
    Internal(String),
}

impl MemoryCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl CredentialProvider for MemoryCredentialProvider {
    type Error = MemoryCredentialProviderError;

    async fn insert(&self, username: &str, password_hash: &str) -> Result<bool, Self::Error> {
        let mut inner = self.inner.write();
        if inner.contains_key(username) {
            return Ok(false);
        }
        inner.insert(username.to_string(), password_hash.to_string());
        Ok(true)
    }

    async fn password_hash(&self, username: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.inner.read().get(username).cloned())
    }
}

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::filter::ImageFilter;
use super::image::{ImageId, ImageName, ImageRecord};
use super::provider::{CatalogError, CatalogProvider};
use super::view::UserEntry;

/// In-memory catalog provider
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogProvider {
    inner: Arc<RwLock<MemoryCatalogProviderInner>>,
}

#[derive(Debug, Default)]
struct MemoryCatalogProviderInner {
    /// Records in insertion order
    images: Vec<ImageRecord>,
    /// Directory: user id -> entry
    users: HashMap<String, UserEntry>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryCatalogProviderError {
    #[error("memory provider error: {0}")]
    Internal(String),
}

type Result<T> = std::result::Result<T, CatalogError<MemoryCatalogProviderError>>;

fn poisoned<E: std::fmt::Display>(e: E) -> CatalogError<MemoryCatalogProviderError> {
    CatalogError::Provider(MemoryCatalogProviderError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

impl MemoryCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogProvider for MemoryCatalogProvider {
    type Error = MemoryCatalogProviderError;

    async fn select_images(&self, filter: &ImageFilter) -> Result<Vec<ImageRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .images
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn select_users(&self, ids: &[String]) -> Result<Vec<UserEntry>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .images
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn insert_image(&self, record: &ImageRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.images.iter().any(|r| r.id == record.id) {
            return Err(CatalogError::Provider(MemoryCatalogProviderError::Internal(
                format!("duplicate image id: {}", record.id),
            )));
        }
        inner.images.push(record.clone());
        Ok(())
    }

    async fn rename_by_id(&self, id: &ImageId, name: &ImageName) -> Result<u64> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        match inner.images.iter_mut().find(|r| &r.id == id) {
            Some(record) => {
                record.name = name.as_str().to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn add_user(&self, entry: &UserEntry) -> Result<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.users.contains_key(&entry.id) {
            return Ok(false);
        }
        inner.users.insert(entry.id.clone(), entry.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rename_reports_matched_count() {
        let catalog = MemoryCatalogProvider::new();
        let name = ImageName::parse("before").unwrap();
        let record = catalog.create(&name, "alice", "/uploads/a.png").await.unwrap();

        let after = ImageName::parse("after").unwrap();
        assert_eq!(catalog.rename_by_id(&record.id, &after).await.unwrap(), 1);
        assert_eq!(
            catalog.rename_by_id(&ImageId::from("missing"), &after).await.unwrap(),
            0
        );
        assert_eq!(catalog.get_by_id(&record.id).await.unwrap().name, "after");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let catalog = MemoryCatalogProvider::new();
        let id = ImageId::from("nope");
        assert_eq!(
            catalog.get_by_id(&id).await,
            Err(CatalogError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_add_user_is_idempotent() {
        let catalog = MemoryCatalogProvider::new();
        let entry = UserEntry::new("alice", "alice", "alice@example.com");
        assert!(catalog.add_user(&entry).await.unwrap());

        let changed = UserEntry::new("alice", "alice", "other@example.com");
        assert!(!catalog.add_user(&changed).await.unwrap());

        let users = catalog.select_users(&["alice".to_string()]).await.unwrap();
        assert_eq!(users, vec![entry]);
    }
}

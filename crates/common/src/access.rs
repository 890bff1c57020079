//! Ownership checks for catalog mutations.
//!
//! A mutation moves through three states:
//!
//! ```text
//! Identity --(record exists)--> owner known --(owner == identity)--> Authorized
//!                   |                               |
//!                   v                               v
//!               NotFound                        Forbidden
//! ```
//!
//! Existence is checked first so that a missing record never reports
//! `Forbidden`. The owner is always read back from the catalog; callers
//! cannot supply it. Mutating methods on [`OwnershipGate`] take an
//! [`Authorized`] grant, which only [`OwnershipGate::authorize`] produces.

use crate::auth::Identity;
use crate::catalog::{CatalogError, CatalogProvider, ImageId, ImageName, ImageRecord};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError<T> {
    #[error("image not found: {0}")]
    NotFound(ImageId),
    #[error("{username} does not own image {image}")]
    Forbidden { image: ImageId, username: String },
    #[error("unhandled catalog provider error: {0}")]
    Provider(T),
}

impl<T> From<CatalogError<T>> for AccessError<T> {
    fn from(e: CatalogError<T>) -> Self {
        match e {
            CatalogError::NotFound(id) => AccessError::NotFound(id),
            CatalogError::Provider(e) => AccessError::Provider(e),
        }
    }
}

/// Proof that an identity owns a record, as of the check
#[derive(Debug)]
pub struct Authorized {
    record: ImageRecord,
    identity: Identity,
}

impl Authorized {
    pub fn record(&self) -> &ImageRecord {
        &self.record
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

#[derive(Debug, Clone)]
pub struct OwnershipGate<P> {
    catalog: P,
}

impl<P: CatalogProvider> OwnershipGate<P> {
    pub fn new(catalog: P) -> Self {
        Self { catalog }
    }

    pub async fn authorize(
        &self,
        identity: &Identity,
        id: &ImageId,
    ) -> Result<Authorized, AccessError<P::Error>> {
        let record = self.catalog.get_by_id(id).await?;

        if record.owner_id != identity.username() {
            tracing::debug!(
                image = %id,
                owner = %record.owner_id,
                caller = %identity,
                "ownership check failed"
            );
            return Err(AccessError::Forbidden {
                image: id.clone(),
                username: identity.username().to_string(),
            });
        }

        Ok(Authorized {
            record,
            identity: identity.clone(),
        })
    }

    /// Rename an authorized record, returning it with the new name
    pub async fn rename(
        &self,
        grant: Authorized,
        name: &ImageName,
    ) -> Result<ImageRecord, AccessError<P::Error>> {
        let Authorized { mut record, identity } = grant;

        // record may have vanished since the check
        if self.catalog.rename_by_id(&record.id, name).await? == 0 {
            return Err(AccessError::NotFound(record.id));
        }

        tracing::info!(image = %record.id, owner = %identity, "renamed image");
        record.name = name.as_str().to_string();
        Ok(record)
    }

    /// Authorize then rename in one call
    pub async fn rename_as(
        &self,
        identity: &Identity,
        id: &ImageId,
        name: &ImageName,
    ) -> Result<ImageRecord, AccessError<P::Error>> {
        let grant = self.authorize(identity, id).await?;
        self.rename(grant, name).await
    }
}

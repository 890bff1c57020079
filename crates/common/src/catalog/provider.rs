use std::collections::BTreeSet;
use std::fmt::{Debug, Display};

use async_trait::async_trait;

use super::filter::ImageFilter;
use super::image::{ImageId, ImageName, ImageRecord};
use super::view::{directory, project, ImageView, UserEntry};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError<T> {
    #[error("unhandled catalog provider error: {0}")]
    Provider(#[from] T),
    /// No image record with the id exists
    #[error("image not found: {0}")]
    NotFound(ImageId),
}

/// Storage for image records and the user directory they reference.
///
/// Records and directory entries live in independent collections.
/// The only relationship between them, `owner_id -> UserEntry::id`, is
/// resolved at read time by [`CatalogProvider::list`].
#[async_trait]
pub trait CatalogProvider: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Records matching the filter, in store order
    async fn select_images(
        &self,
        filter: &ImageFilter,
    ) -> Result<Vec<ImageRecord>, CatalogError<Self::Error>>;

    /// Directory entries for the given ids. Ids with no entry are
    /// simply absent from the result.
    async fn select_users(&self, ids: &[String]) -> Result<Vec<UserEntry>, CatalogError<Self::Error>>;

    /// # Returns
    /// * `Ok(record)` - the record
    /// * `Err(CatalogError::NotFound)` - no record has this id
    async fn get_by_id(&self, id: &ImageId) -> Result<ImageRecord, CatalogError<Self::Error>>;

    /// Persist a fully formed record
    async fn insert_image(&self, record: &ImageRecord) -> Result<(), CatalogError<Self::Error>>;

    /// Replace the name of one record in place.
    ///
    /// # Returns
    /// * `Ok(1)` - the record existed and was updated
    /// * `Ok(0)` - no record has this id
    async fn rename_by_id(
        &self,
        id: &ImageId,
        name: &ImageName,
    ) -> Result<u64, CatalogError<Self::Error>>;

    /// Add a directory entry unless one with the same id exists.
    ///
    /// Returns whether the entry was added.
    async fn add_user(&self, entry: &UserEntry) -> Result<bool, CatalogError<Self::Error>>;

    /// Filtered, denormalized listing.
    ///
    /// Every matching record yields exactly one view; owners with no
    /// directory entry are rendered with the sentinel author.
    async fn list(&self, filter: &ImageFilter) -> Result<Vec<ImageView>, CatalogError<Self::Error>> {
        let records = self.select_images(filter).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let owners: Vec<String> = records
            .iter()
            .map(|r| r.owner_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let entries = self.select_users(&owners).await?;

        Ok(project(records, &directory(entries)))
    }

    /// Create a record under a fresh id. The name is stored verbatim.
    async fn create(
        &self,
        name: &ImageName,
        owner_id: &str,
        src: &str,
    ) -> Result<ImageRecord, CatalogError<Self::Error>> {
        let record = ImageRecord {
            id: ImageId::generate(),
            src: src.to_string(),
            name: name.as_str().to_string(),
            owner_id: owner_id.to_string(),
        };
        self.insert_image(&record).await?;
        tracing::debug!(id = %record.id, owner = owner_id, "created image record");
        Ok(record)
    }
}

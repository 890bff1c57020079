//! On-disk storage for uploaded image files.
//!
//! The catalog only ever sees the `src` reference produced here.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Default upload cap (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Public path prefix uploaded files are served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Accepted content types and the extension stored files get
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("upload is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("upload is empty")]
    Empty,
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written to the uploads directory
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    /// Reference handed to the catalog
    pub src: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Result<Self, UploadError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// File extension for an accepted content type
    pub fn extension_for(content_type: &str) -> Result<&'static str, UploadError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        ACCEPTED_TYPES
            .iter()
            .find(|(mime, _)| *mime == essence)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))
    }

    /// Validate and persist an upload
    pub async fn store(&self, content_type: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
        let ext = Self::extension_for(content_type)?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let file_name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            ext
        );
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");

        Ok(StoredFile {
            src: format!("{}/{}", UPLOADS_ROUTE, file_name),
            file_name,
            path,
        })
    }

    /// Best-effort removal of a stored file whose catalog insert failed
    pub async fn discard(&self, file: &StoredFile) {
        if let Err(e) = tokio::fs::remove_file(&file.path).await {
            tracing::warn!(path = %file.path.display(), "failed to remove orphaned upload: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_types() {
        assert_eq!(UploadStore::extension_for("image/png").unwrap(), "png");
        assert_eq!(UploadStore::extension_for("image/jpeg").unwrap(), "jpg");
        assert_eq!(UploadStore::extension_for("IMAGE/JPG").unwrap(), "jpg");
        assert!(matches!(
            UploadStore::extension_for("image/gif"),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(UploadStore::extension_for("text/plain").is_err());
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), 16).await.unwrap();

        let file = store.store("image/png", b"\x89PNG....").await.unwrap();
        assert!(file.src.starts_with("/uploads/"));
        assert!(file.file_name.ends_with(".png"));
        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"\x89PNG....");
    }

    #[tokio::test]
    async fn test_store_enforces_cap() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path(), 4).await.unwrap();

        assert!(matches!(
            store.store("image/png", b"12345").await,
            Err(UploadError::TooLarge { size: 5, max: 4 })
        ));
        assert!(matches!(
            store.store("image/png", b"").await,
            Err(UploadError::Empty)
        ));
    }
}

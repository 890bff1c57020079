//! Denormalized image views.
//!
//! Resolving owners happens in two steps: the provider looks up the
//! directory entries for the owner ids it was handed, and [`project`]
//! joins them onto the records. Projection is a left join; a record whose
//! owner has no directory entry gets a sentinel author instead of being
//! dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::image::{ImageId, ImageRecord};

pub const UNKNOWN_USERNAME: &str = "Unknown User";
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// A user directory entry, embedded as an image's author
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl UserEntry {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
        }
    }

    /// Stand-in author for an owner id with no directory entry
    pub fn unknown(owner_id: impl Into<String>) -> Self {
        Self::new(owner_id, UNKNOWN_USERNAME, UNKNOWN_EMAIL)
    }
}

/// Read-only projection of an image with its author resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageView {
    pub id: ImageId,
    pub src: String,
    pub name: String,
    pub author: UserEntry,
}

impl ImageView {
    pub fn new(record: ImageRecord, author: UserEntry) -> Self {
        Self {
            id: record.id,
            src: record.src,
            name: record.name,
            author,
        }
    }
}

/// Index directory entries by id
pub fn directory(entries: impl IntoIterator<Item = UserEntry>) -> HashMap<String, UserEntry> {
    entries.into_iter().map(|e| (e.id.clone(), e)).collect()
}

/// Join records to their authors. Emits exactly one view per record,
/// in record order.
pub fn project(records: Vec<ImageRecord>, directory: &HashMap<String, UserEntry>) -> Vec<ImageView> {
    records
        .into_iter()
        .map(|record| {
            let author = directory
                .get(&record.owner_id)
                .cloned()
                .unwrap_or_else(|| UserEntry::unknown(record.owner_id.clone()));
            ImageView::new(record, author)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, owner: &str) -> ImageRecord {
        ImageRecord {
            id: ImageId::from(id),
            src: format!("/uploads/{}.png", id),
            name: format!("image {}", id),
            owner_id: owner.to_string(),
        }
    }

    #[test]
    fn test_missing_owner_gets_sentinel() {
        let views = project(vec![record("1", "ghost")], &HashMap::new());
        assert_eq!(views.len(), 1);
        assert_eq!(
            views[0].author,
            UserEntry {
                id: "ghost".into(),
                username: "Unknown User".into(),
                email: "unknown@example.com".into(),
            }
        );
    }

    #[test]
    fn test_known_owner_resolved() {
        let dir = directory([UserEntry::new("alice", "alice", "alice@example.com")]);
        let views = project(vec![record("1", "alice"), record("2", "ghost")], &dir);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].author.email, "alice@example.com");
        assert_eq!(views[1].author.username, UNKNOWN_USERNAME);
        assert_eq!(views[1].id, ImageId::from("2"));
    }

    #[test]
    fn test_view_serializes_flat_shape() {
        let dir = directory([UserEntry::new("bob", "bob", "bob@example.com")]);
        let view = project(vec![record("7", "bob")], &dir).remove(0);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], "7");
        assert_eq!(json["src"], "/uploads/7.png");
        assert_eq!(json["author"]["username"], "bob");
        assert!(json.get("owner_id").is_none());
    }
}

//! Image catalog
//!
//! Image records reference their owner by id only. Reads resolve that
//! reference against the user directory and produce [`ImageView`]s;
//! writes never copy author data onto the record.

mod filter;
mod image;
mod memory;
mod provider;
mod view;

pub use filter::{fold_case, ImageFilter, LIKE_ESCAPE};
pub use image::{ImageId, ImageName, ImageRecord, NameError, MAX_NAME_CHARS};
pub use memory::{MemoryCatalogProvider, MemoryCatalogProviderError};
pub use provider::{CatalogError, CatalogProvider};
pub use view::{directory, project, ImageView, UserEntry, UNKNOWN_EMAIL, UNKNOWN_USERNAME};

/// Email given to directory entries created at registration when the
/// caller supplies none
pub const DEFAULT_EMAIL: &str = "example@example.com";

use serde::{Deserialize, Serialize};

use super::image::ImageRecord;

/// Escape character used in LIKE patterns produced by [`ImageFilter::like_pattern`]
pub const LIKE_ESCAPE: char = '\\';

/// Case folding applied to both image names and search needles.
/// Stores that match in SQL persist the folded name next to the original.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Optional, independent catalog filters. Both present means AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilter {
    /// Literal, case-insensitive substring of the image name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substring: Option<String>,
    /// Exact owner id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ImageFilter {
    /// Build a filter from raw query input. Whitespace around either
    /// value is dropped and blank values count as absent.
    pub fn new(substring: Option<&str>, owner: Option<&str>) -> Self {
        fn clean(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            substring: clean(substring),
            owner: clean(owner),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_substring(mut self, substring: &str) -> Self {
        self.substring = Self::new(Some(substring), None).substring;
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Self::new(None, Some(owner)).owner;
        self
    }

    /// True when neither filter is set
    pub fn is_unfiltered(&self) -> bool {
        self.substring.is_none() && self.owner.is_none()
    }

    pub fn matches(&self, record: &ImageRecord) -> bool {
        if let Some(owner) = &self.owner {
            if &record.owner_id != owner {
                return false;
            }
        }
        match &self.substring {
            Some(needle) => fold_case(&record.name).contains(&fold_case(needle)),
            None => true,
        }
    }

    /// The case-folded substring as a `LIKE` pattern, with `%`, `_` and
    /// the escape character itself escaped. Match it against a column
    /// holding [`fold_case`] of the name, with `ESCAPE '\'`.
    pub fn like_pattern(&self) -> Option<String> {
        self.substring.as_deref().map(|needle| {
            let needle = fold_case(needle);
            let mut pattern = String::with_capacity(needle.len() + 2);
            pattern.push('%');
            for c in needle.chars() {
                if matches!(c, '%' | '_' | LIKE_ESCAPE) {
                    pattern.push(LIKE_ESCAPE);
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

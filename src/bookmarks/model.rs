use serde::{Deserialize, Serialize};

use super::MAX_BOOKMARKS;

/// Saved reference to a video. `id` is unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub views: u64,
}

impl Bookmark {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            views: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityStatus {
    pub current: usize,
    pub max: usize,
    pub is_near_limit: bool,
    pub is_at_limit: bool,
}

impl CapacityStatus {
    /// Near the limit from 90% of capacity on.
    pub fn for_count(current: usize) -> Self {
        let warning_at = MAX_BOOKMARKS * 9 / 10;
        Self {
            current,
            max: MAX_BOOKMARKS,
            is_near_limit: current >= warning_at,
            is_at_limit: current >= MAX_BOOKMARKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// Imported records overwrite same-id records; the rest are kept.
    #[default]
    Merge,
    /// Imported records become the whole collection.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows accepted from the file.
    pub imported: usize,
    /// Rows rejected as malformed.
    pub skipped: usize,
    /// Size of the collection after the import.
    pub total: usize,
}

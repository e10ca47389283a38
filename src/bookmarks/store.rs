use std::{collections::HashMap, sync::Arc};

use crate::storage::{SlotStore, BOOKMARKS_KEY};
use crate::{log_debug, log_error, log_info};

use super::{
    csv,
    error::BookmarkResult,
    Bookmark, CapacityError, CapacityStatus, ImportMode, ImportSummary, ValidationError,
    FIELD_DELIMITER, MAX_BOOKMARKS, MAX_DESCRIPTION_CHARS,
};

const ENABLE_LOGS: bool = true;

/// Capacity-bounded bookmark collection persisted as one JSON blob.
///
/// Every operation reads the blob, and every mutation writes it back whole.
/// Storage failures never surface as errors: reads fall back to an empty
/// collection and failed writes are logged (and reported as `false` where the
/// operation returns a flag). A mutation whose read fails writes nothing.
#[derive(Clone)]
pub struct BookmarkStore {
    slots: Arc<dyn SlotStore>,
}

impl BookmarkStore {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// All bookmarks in collection order.
    pub fn list(&self) -> Vec<Bookmark> {
        self.load()
    }

    pub fn get(&self, video_id: &str) -> Option<Bookmark> {
        self.load().into_iter().find(|b| b.id == video_id)
    }

    pub fn add(&self, video_id: &str, description: &str) -> BookmarkResult<Bookmark> {
        let description = description.trim();
        validate_fields(video_id, description)?;

        let mut bookmarks = match self.try_load() {
            Ok(bookmarks) => bookmarks,
            Err(err) => {
                log_error!(
                    "Not saving bookmark {}, existing bookmarks unreadable: {err:#}",
                    video_id
                );
                return Ok(Bookmark::new(video_id, description));
            }
        };
        if bookmarks.iter().any(|b| b.id == video_id) {
            return Err(ValidationError::Duplicate(video_id.to_string()).into());
        }
        if bookmarks.len() >= MAX_BOOKMARKS {
            return Err(CapacityError::StoreFull.into());
        }

        let bookmark = Bookmark::new(video_id, description);
        bookmarks.push(bookmark.clone());
        if self.save(&bookmarks) {
            log_info!("Bookmarked video {}", video_id);
        }
        Ok(bookmark)
    }

    /// Returns whether a bookmark was deleted.
    pub fn remove(&self, video_id: &str) -> bool {
        let Some(mut bookmarks) = self.load_for_update() else {
            return false;
        };
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != video_id);

        if bookmarks.len() == before {
            log_debug!("No bookmark to remove for video {}", video_id);
            return false;
        }
        self.save(&bookmarks)
    }

    /// Counts one more view. Returns `false` if there is no such bookmark.
    pub fn increment_views(&self, video_id: &str) -> bool {
        let Some(mut bookmarks) = self.load_for_update() else {
            return false;
        };
        let Some(bookmark) = bookmarks.iter_mut().find(|b| b.id == video_id) else {
            return false;
        };
        bookmark.views = bookmark.views.saturating_add(1);
        self.save(&bookmarks)
    }

    pub fn capacity_status(&self) -> CapacityStatus {
        CapacityStatus::for_count(self.load().len())
    }

    pub fn export_csv(&self) -> String {
        csv::encode(&self.load())
    }

    /// Nothing is written unless the whole import succeeds. A merge whose
    /// existing bookmarks cannot be read writes nothing and reports a total
    /// of zero, matching what [`Self::list`] then shows.
    pub fn import_csv(&self, text: &str, mode: ImportMode) -> BookmarkResult<ImportSummary> {
        let parsed = csv::decode(text)?;
        let imported = parsed.records.len();

        let (base, base_readable) = match mode {
            ImportMode::Replace => (Vec::new(), true),
            ImportMode::Merge => match self.try_load() {
                Ok(existing) => (existing, true),
                Err(err) => {
                    log_error!("Skipping merge import, existing bookmarks unreadable: {err:#}");
                    (Vec::new(), false)
                }
            },
        };
        let merged = overlay(base, parsed.records);

        if merged.len() > MAX_BOOKMARKS {
            return Err(CapacityError::ImportTooLarge {
                attempted: merged.len(),
            }
            .into());
        }
        if !base_readable {
            return Ok(ImportSummary {
                imported,
                skipped: parsed.skipped,
                total: 0,
            });
        }

        self.save(&merged);
        log_info!(
            "Imported {} bookmarks ({:?}), skipped {}, total {}",
            imported,
            mode,
            parsed.skipped,
            merged.len()
        );

        Ok(ImportSummary {
            imported,
            skipped: parsed.skipped,
            total: merged.len(),
        })
    }

    /// Read path: an unreachable backend reads as an empty collection.
    fn load(&self) -> Vec<Bookmark> {
        self.try_load().unwrap_or_else(|err| {
            log_error!("Error loading bookmarks: {err:#}");
            Vec::new()
        })
    }

    /// Mutation path: `None` when the backend cannot be read, so the caller
    /// skips its write instead of overwriting records it never saw.
    fn load_for_update(&self) -> Option<Vec<Bookmark>> {
        match self.try_load() {
            Ok(bookmarks) => Some(bookmarks),
            Err(err) => {
                log_error!("Leaving bookmarks unchanged, read failed: {err:#}");
                None
            }
        }
    }

    /// Fails only when the backend itself fails. A record that does not parse
    /// is logged and read as empty, since there is nothing in it to keep.
    fn try_load(&self) -> anyhow::Result<Vec<Bookmark>> {
        let Some(raw) = self.slots.read_slot(BOOKMARKS_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(bookmarks) => Ok(bookmarks),
            Err(err) => {
                log_error!("Error parsing stored bookmarks: {err}");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, bookmarks: &[Bookmark]) -> bool {
        let serialized = match serde_json::to_string(bookmarks) {
            Ok(serialized) => serialized,
            Err(err) => {
                log_error!("Error serializing bookmarks: {err}");
                return false;
            }
        };

        match self.slots.write_slot(BOOKMARKS_KEY, &serialized) {
            Ok(()) => true,
            Err(err) => {
                log_error!("Error saving bookmarks: {err:#}");
                false
            }
        }
    }
}

/// Rejects input that the CSV codec could not read back as the same record.
/// Expects `description` already trimmed.
fn validate_fields(video_id: &str, description: &str) -> Result<(), ValidationError> {
    if video_id.is_empty() || description.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if video_id.trim() != video_id || video_id.contains([FIELD_DELIMITER, '\n', '\r']) {
        return Err(ValidationError::InvalidId(video_id.to_string()));
    }
    if description.contains(FIELD_DELIMITER) {
        return Err(ValidationError::ForbiddenDelimiter);
    }
    if description.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreak);
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

/// Applies `incoming` over `base` by id. A matching record is replaced in
/// place, new ids are appended in arrival order.
fn overlay(base: Vec<Bookmark>, incoming: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut merged = Vec::with_capacity(base.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for bookmark in base.into_iter().chain(incoming) {
        match positions.get(&bookmark.id) {
            Some(&index) => merged[index] = bookmark,
            None => {
                positions.insert(bookmark.id.clone(), merged.len());
                merged.push(bookmark);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::{BookmarkError, FormatError};
    use crate::storage::MemoryStore;

    fn store() -> BookmarkStore {
        BookmarkStore::new(Arc::new(MemoryStore::new()))
    }

    fn seeded(records: &[(&str, &str, u64)]) -> BookmarkStore {
        let slots = Arc::new(MemoryStore::new());
        let bookmarks: Vec<Bookmark> = records
            .iter()
            .map(|(id, description, views)| Bookmark {
                id: id.to_string(),
                description: description.to_string(),
                views: *views,
            })
            .collect();
        slots
            .write_slot(BOOKMARKS_KEY, &serde_json::to_string(&bookmarks).unwrap())
            .unwrap();
        BookmarkStore::new(slots)
    }

    #[test]
    fn add_creates_unviewed_bookmark() {
        let store = store();
        let bookmark = store.add("abc123XYZ_-", "My desc").unwrap();
        assert_eq!(
            bookmark,
            Bookmark {
                id: "abc123XYZ_-".into(),
                description: "My desc".into(),
                views: 0,
            }
        );
        assert_eq!(store.get("abc123XYZ_-"), Some(bookmark));
    }

    #[test]
    fn add_trims_description() {
        let store = store();
        let bookmark = store.add("vid", "  Deep work  ").unwrap();
        assert_eq!(bookmark.description, "Deep work");
    }

    #[test]
    fn add_rejects_invalid_input() {
        let store = store();
        assert_eq!(
            store.add("", "desc"),
            Err(BookmarkError::Validation(ValidationError::MissingField))
        );
        assert_eq!(
            store.add("vid", "   "),
            Err(BookmarkError::Validation(ValidationError::MissingField))
        );
        assert_eq!(
            store.add("vid", "Test; Video"),
            Err(BookmarkError::Validation(ValidationError::ForbiddenDelimiter))
        );
        assert_eq!(
            store.add("vid", &"é".repeat(MAX_DESCRIPTION_CHARS + 1)),
            Err(BookmarkError::Validation(ValidationError::DescriptionTooLong))
        );
        assert!(store.add("vid", &"é".repeat(MAX_DESCRIPTION_CHARS)).is_ok());
    }

    #[test]
    fn add_rejects_fields_that_would_split_a_csv_row() {
        let store = store();
        for id in ["abc;def;ghi", " padded", "padded ", "two\nlines", "carriage\r"] {
            assert_eq!(
                store.add(id, "Focus mix"),
                Err(BookmarkError::Validation(ValidationError::InvalidId(
                    id.into()
                ))),
                "{id:?}"
            );
        }
        for description in ["first\nsecond", "first\rsecond"] {
            assert_eq!(
                store.add("line", description),
                Err(BookmarkError::Validation(ValidationError::LineBreak))
            );
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let store = store();
        store.add("abc123XYZ_-", "My desc").unwrap();
        assert_eq!(
            store.add("abc123XYZ_-", "Other"),
            Err(BookmarkError::Validation(ValidationError::Duplicate(
                "abc123XYZ_-".into()
            )))
        );
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let store = seeded(&[("a", "A", 5), ("b", "B", 3)]);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(!store.remove("missing"));
        let ids: Vec<String> = store.list().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn increment_views_adds_exactly_one() {
        let store = seeded(&[("a", "A", 5)]);
        assert!(store.increment_views("a"));
        assert_eq!(store.get("a").unwrap().views, 6);
        assert!(!store.increment_views("missing"));
    }

    #[test]
    fn corrupt_blob_reads_as_empty() {
        let slots = Arc::new(MemoryStore::new());
        slots.write_slot(BOOKMARKS_KEY, "invalid json").unwrap();
        let store = BookmarkStore::new(slots);
        assert!(store.list().is_empty());
        assert_eq!(store.capacity_status().current, 0);
    }

    #[test]
    fn export_orders_by_views() {
        let store = seeded(&[("test456", "Another Video", 3), ("test123", "Test Video", 5)]);
        assert_eq!(
            store.export_csv(),
            "IDVideo;Description;Views\ntest123;Test Video;5\ntest456;Another Video;3"
        );
    }

    #[test]
    fn merge_import_overwrites_matching_ids_and_keeps_others() {
        let store = seeded(&[("keep", "Untouched", 2), ("dup", "Old text", 40)]);
        let summary = store
            .import_csv(
                "IDVideo;Description;Views\ndup;New text;1\nfresh;Fresh;0",
                ImportMode::Merge,
            )
            .unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                skipped: 0,
                total: 3,
            }
        );

        assert_eq!(store.get("keep").unwrap().description, "Untouched");
        let dup = store.get("dup").unwrap();
        assert_eq!(dup.description, "New text");
        assert_eq!(dup.views, 1);
        let ids: Vec<String> = store.list().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["keep", "dup", "fresh"]);
    }

    #[test]
    fn replace_import_discards_existing_records() {
        let store = seeded(&[("old", "Old", 9)]);
        let summary = store
            .import_csv(
                "IDVideo;Description;Views\nnew;New;1\ninvalid;row",
                ImportMode::Replace,
            )
            .unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total, 1);
        assert_eq!(store.get("old"), None);
    }

    #[test]
    fn duplicate_rows_in_one_import_keep_the_last() {
        let store = store();
        let summary = store
            .import_csv(
                "IDVideo;Description;Views\nx;First;1\nx;Second;2",
                ImportMode::Replace,
            )
            .unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.total, 1);
        assert_eq!(store.get("x").unwrap().description, "Second");
    }

    #[test]
    fn bad_header_leaves_store_untouched() {
        let store = seeded(&[("a", "A", 1)]);
        let before = store.list();
        assert_eq!(
            store.import_csv("Wrong;Description;Views\nb;B;2", ImportMode::Replace),
            Err(BookmarkError::Format(FormatError::InvalidHeader))
        );
        assert_eq!(store.list(), before);
    }

    #[test]
    fn import_beyond_capacity_fails_without_writing() {
        let existing: Vec<(String, String, u64)> = (0..MAX_BOOKMARKS)
            .map(|i| (format!("v{i}"), format!("Video {i}"), 0))
            .collect();
        let borrowed: Vec<(&str, &str, u64)> = existing
            .iter()
            .map(|(id, d, v)| (id.as_str(), d.as_str(), *v))
            .collect();
        let store = seeded(&borrowed);

        let result = store.import_csv("IDVideo;Description;Views\nextra;Extra;0", ImportMode::Merge);
        assert_eq!(
            result,
            Err(BookmarkError::Capacity(CapacityError::ImportTooLarge {
                attempted: MAX_BOOKMARKS + 1
            }))
        );
        assert_eq!(store.list().len(), MAX_BOOKMARKS);
        assert_eq!(store.get("extra"), None);

        // Overwriting an existing id does not grow the collection.
        let summary = store
            .import_csv("IDVideo;Description;Views\nv0;Renamed;3", ImportMode::Merge)
            .unwrap();
        assert_eq!(summary.total, MAX_BOOKMARKS);
    }
}

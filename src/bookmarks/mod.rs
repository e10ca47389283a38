pub mod csv;
pub mod error;
pub mod model;
pub mod store;

pub use error::{BookmarkError, CapacityError, FormatError, ValidationError};
pub use model::{Bookmark, CapacityStatus, ImportMode, ImportSummary};
pub use store::BookmarkStore;

/// Most bookmarks the store will hold.
pub const MAX_BOOKMARKS: usize = 1000;
/// Longest accepted description, in Unicode scalar values.
pub const MAX_DESCRIPTION_CHARS: usize = 200;
/// Field separator of the CSV codec; never allowed inside a description.
pub const FIELD_DELIMITER: char = ';';

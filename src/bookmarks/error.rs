use thiserror::Error;

use super::{MAX_BOOKMARKS, MAX_DESCRIPTION_CHARS};

/// Malformed bookmark input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Video ID and description are required")]
    MissingField,
    #[error("Video ID {0:?} cannot have surrounding spaces, semicolons or line breaks")]
    InvalidId(String),
    #[error("Description cannot contain semicolon (;) character")]
    ForbiddenDelimiter,
    #[error("Description cannot contain line breaks")]
    LineBreak,
    #[error("Description cannot exceed {max} characters", max = MAX_DESCRIPTION_CHARS)]
    DescriptionTooLong,
    #[error("Bookmark already exists for video {0}")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("Maximum bookmark limit reached ({max})", max = MAX_BOOKMARKS)]
    StoreFull,
    #[error("Import would exceed maximum bookmark limit ({max}): {attempted} bookmarks", max = MAX_BOOKMARKS)]
    ImportTooLarge { attempted: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("CSV file must contain at least a header and one data row")]
    TooFewLines,
    #[error("Invalid CSV headers. Expected: IDVideo, Description, Views")]
    InvalidHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookmarkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type BookmarkResult<T> = Result<T, BookmarkError>;

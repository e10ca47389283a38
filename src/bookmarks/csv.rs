//! `;`-delimited text codec for bookmark export and import.
//!
//! No quoting or escaping: descriptions are guaranteed never to contain the
//! delimiter, so a plain split is exact.

use super::{Bookmark, FormatError, FIELD_DELIMITER, MAX_DESCRIPTION_CHARS};

pub const HEADER_FIELDS: [&str; 3] = ["IDVideo", "Description", "Views"];
pub const HEADER: &str = "IDVideo;Description;Views";

/// Rows accepted from an import, in file order, plus the rejected count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub records: Vec<Bookmark>,
    pub skipped: usize,
}

/// Header line, then one `id;description;views` line per bookmark, most
/// viewed first. Equal view counts keep their collection order.
pub fn encode(bookmarks: &[Bookmark]) -> String {
    let mut sorted: Vec<&Bookmark> = bookmarks.iter().collect();
    sorted.sort_by(|a, b| b.views.cmp(&a.views));

    let rows = sorted
        .iter()
        .map(|bookmark| {
            format!(
                "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
                bookmark.id, bookmark.description, bookmark.views
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{HEADER}\n{rows}")
}

pub fn decode(text: &str) -> Result<ParsedCsv, FormatError> {
    let lines: Vec<&str> = text
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if lines.len() < 2 {
        return Err(FormatError::TooFewLines);
    }

    let header: Vec<&str> = lines[0].split(FIELD_DELIMITER).map(str::trim).collect();
    if header != HEADER_FIELDS {
        return Err(FormatError::InvalidHeader);
    }

    let mut parsed = ParsedCsv::default();
    for line in &lines[1..] {
        match parse_row(line) {
            Some(bookmark) => parsed.records.push(bookmark),
            None => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}

/// Fields past the third are ignored.
fn parse_row(line: &str) -> Option<Bookmark> {
    let mut columns = line.split(FIELD_DELIMITER);
    let id = columns.next()?.trim();
    let description = columns.next()?.trim();
    let views = columns.next()?;

    if id.is_empty() || description.is_empty() {
        return None;
    }
    if id.contains('\r') || description.contains('\r') {
        return None;
    }
    if description.contains(FIELD_DELIMITER)
        || description.chars().count() > MAX_DESCRIPTION_CHARS
    {
        return None;
    }

    Some(Bookmark {
        id: id.to_string(),
        description: description.to_string(),
        views: parse_views(views),
    })
}

/// Leading decimal digits of the trimmed field; anything unparsable,
/// including a sign, counts as zero.
fn parse_views(raw: &str) -> u64 {
    let trimmed = raw.trim();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().unwrap_or(0)
}

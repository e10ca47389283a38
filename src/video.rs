use std::sync::LazyLock;

use regex::Regex;

/// The id must fill the whole path segment or query value, so longer or
/// punctuated segments are rejected rather than truncated.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([a-zA-Z0-9_-]{11})(?:[#&?].*)?$")
        .expect("video URL pattern is valid")
});

static BARE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("video id pattern is valid"));

/// Pulls the 11-character video id out of a share/watch/embed URL, or accepts
/// a bare id. Returns `None` for anything else.
pub fn extract_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if let Some(id) = URL_PATTERN.captures(trimmed).and_then(|c| c.get(1)) {
        return Some(id.as_str().to_string());
    }

    BARE_ID_PATTERN
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}

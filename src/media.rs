use std::sync::LazyLock;

use regex::Regex;

/// matches short links, embed links, `watch?v=` and `&v=` query forms
/// the id is whatever follows up to the next `#`, `&` or `?`
/// `\w` is ascii only, the same as in browsers
static MEDIA_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/(?-u:\w)/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("media link pattern should compile")
});

pub const MEDIA_ID_LEN: usize = 11;

/// Extracts the 11 character video id out of a link.
///
/// Length is counted in UTF-16 code units, the way browsers measure strings.
///
/// Anything that doesn't look like a video link (or has an id of the wrong length)
/// yields `None`, never an error.
#[must_use]
pub fn extract_media_id(link: &str) -> Option<String> {
    MEDIA_LINK
        .captures(link)
        .and_then(|caps| caps.get(2))
        .map(|id| id.as_str())
        .filter(|id| id.encode_utf16().count() == MEDIA_ID_LEN)
        .map(str::to_string)
}

#[must_use]
pub fn thumbnail_url(media_id: &str) -> String {
    format!("https://img.youtube.com/vi/{media_id}/0.jpg")
}

/// thumbnail for a link, if we can find an id in it
#[must_use]
pub fn preview_url(link: &str) -> Option<String> {
    extract_media_id(link).map(|id| thumbnail_url(&id))
}

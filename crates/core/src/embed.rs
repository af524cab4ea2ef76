//! YouTube URL resolution for embeddable video players
//!
//! Hosts paste video links in whatever form their browser gave them. The
//! resolver is deliberately permissive: it tolerates `watch?v=`, shortened
//! `youtu.be/`, `embed/`, `v/` and `&v=` forms, and answers `None` for
//! anything else so callers can fall back to a plain external link.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical YouTube video ids are exactly 11 characters
const VIDEO_ID_LEN: usize = 11;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtu\.be/|/v/|u/\w/|embed/|watch\?v=|&v=)([^#&?/]*)")
        .expect("video id pattern is valid")
});

/// Extract the embeddable video id from a URL, if there is one
pub fn resolve_embed_id(url: &str) -> Option<String> {
    let captures = VIDEO_ID.captures(url)?;
    let id = captures.get(1)?.as_str();
    if id.len() == VIDEO_ID_LEN {
        Some(id.to_string())
    } else {
        None
    }
}

/// Embeddable player URL for a resolved video id
pub fn embed_url(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link() {
        assert_eq!(
            resolve_embed_id("https://youtu.be/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_watch_link() {
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/watch?v=abc12345678").as_deref(),
            Some("abc12345678")
        );
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/watch?v=abc12345678&t=42").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_embed_link() {
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/embed/abc12345678").as_deref(),
            Some("abc12345678")
        );
    }

    #[test]
    fn test_non_youtube_url_is_none_not_an_error() {
        assert_eq!(resolve_embed_id("https://example.com/video"), None);
        assert_eq!(resolve_embed_id(""), None);
        assert_eq!(resolve_embed_id("not a url"), None);
    }

    #[test]
    fn test_wrong_length_id_is_rejected() {
        assert_eq!(resolve_embed_id("https://youtu.be/short"), None);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url("abc12345678"),
            "https://www.youtube.com/embed/abc12345678"
        );
    }
}

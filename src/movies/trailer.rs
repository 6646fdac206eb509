use std::sync::LazyLock;

use regex::Regex;

static FULL_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v=([^&#]+)").expect("valid regex"));

static SHORT_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"be/([^&#]+)").expect("valid regex"));

/// YouTube video id of a trailer URL.
///
/// Takes what follows the first `v=` (`youtube.com/watch?v=...`), falling back
/// to what follows `be/` (`youtu.be/...`), up to the next `&` or `#`.
/// `None` when neither marker is followed by at least one character.
pub fn extract_youtube_id(url: &str) -> Option<&str> {
    FULL_URL_ID
        .captures(url)
        .or_else(|| SHORT_URL_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=abc123&t=10"),
            Some("abc123")
        );
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=XyZ_9-q#frag"),
            Some("XyZ_9-q")
        );
    }

    #[test]
    fn short_url() {
        assert_eq!(extract_youtube_id("https://youtu.be/XyZ"), Some("XyZ"));
        assert_eq!(extract_youtube_id("https://youtu.be/XyZ?t=3"), Some("XyZ?t=3"));
    }

    #[test]
    fn full_marker_wins_over_short() {
        assert_eq!(
            extract_youtube_id("https://youtu.be/short?v=long"),
            Some("long")
        );
    }

    #[test]
    fn missing_id() {
        assert_eq!(extract_youtube_id("https://example.com/video"), None);
        assert_eq!(extract_youtube_id("https://www.youtube.com/watch?v=&t=1"), None);
        assert_eq!(extract_youtube_id(""), None);
    }
}

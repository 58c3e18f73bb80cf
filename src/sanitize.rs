//! Query sanitization.
//!
//! Raw palette input is echoed into result views and mirrored into a URL
//! parameter, so anything markup- or scheme-shaped is stripped before the
//! rest of the engine sees it. The pipeline is deterministic: the same raw
//! input always produces the same effective query.

/// Schemes neutralized when they prefix the query (case-insensitive).
const BLOCKED_SCHEME: &str = "javascript:";

/// Sanitize raw query text: drop angle brackets and backslashes, strip a
/// leading `javascript:` scheme, truncate to `max_len` characters.
pub fn sanitize_query(raw: &str, max_len: usize) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '\\'))
        .collect();

    if let Some(rest) = strip_blocked_scheme(&cleaned) {
        // Keep whatever followed the scheme so typed text is not swallowed.
        cleaned = rest.to_string();
    }

    if cleaned.chars().count() > max_len {
        cleaned = cleaned.chars().take(max_len).collect();
    }
    cleaned
}

fn strip_blocked_scheme(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let head = trimmed.get(..BLOCKED_SCHEME.len())?;
    if head.eq_ignore_ascii_case(BLOCKED_SCHEME) {
        Some(&trimmed[BLOCKED_SCHEME.len()..])
    } else {
        None
    }
}

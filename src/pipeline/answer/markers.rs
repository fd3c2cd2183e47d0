//! Stage 1: marker-based extraction.
//!
//! The prompt asks the model to wrap its answer in
//! `FINAL_ANSWER:` ... `END_FINAL_ANSWER`. When a complete pair is present
//! the text between them is the answer and nothing else is consulted.

use std::sync::LazyLock;

use regex::Regex;

static MARKER_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)FINAL_ANSWER:\s*(.*?)\s*END_FINAL_ANSWER").expect("valid regex")
});

static LEADING_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]+(?:\s+|$)").expect("valid regex"));

/// Body of the first complete marker pair, trimmed, with a leading bullet
/// removed from its first line. `None` when no complete pair exists.
///
/// `Some("")` is possible: the model emitted the markers around nothing.
pub fn extract_marked_answer(text: &str) -> Option<String> {
    let body = MARKER_BLOCK_RE.captures(text)?.get(1)?.as_str().trim();
    Some(strip_leading_bullet(body).trim().to_string())
}

/// Remove a `-`, `*` or `•` list marker from the start of the first line.
/// A marker with nothing after it is removed too.
pub fn strip_leading_bullet(text: &str) -> &str {
    match LEADING_BULLET_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

//! Stage 0: strip model artifacts from the raw completion.
//!
//! Gemma-family tokenizers leak placeholder tokens (`<unusedN>`) and
//! turn/sequence tokens into decoded text. They carry no meaning for the
//! reader and are removed before any marker search.

use std::sync::LazyLock;

use regex::Regex;

static CONTROL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:unused\d+|start_of_turn|end_of_turn|bos|eos|pad)>").expect("valid regex")
});

/// Trim and remove control tokens. Ordinary angle-bracket text such as
/// "<5 mmol/L" is left alone.
pub fn normalize_completion(raw: &str) -> String {
    let trimmed = raw.trim();
    CONTROL_TOKEN_RE.replace_all(trimmed, "").trim().to_string()
}

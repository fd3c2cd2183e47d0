//! Stage 2: heuristic cleaning when the model ignored the marker contract.
//!
//! The completion is treated as lines. Planning headers and short
//! meta-instructions are dropped, the survivors are rejoined, and the text
//! is cut to the first canonical disease-definition opener if one starts a
//! sentence. Each rejection rule is a named table entry so a new noise
//! pattern is a one-line addition with its own test.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ExtractionTuning;

/// A named line-rejection rule.
pub struct LineRule {
    pub id: &'static str,
    regex: Regex,
}

impl LineRule {
    pub fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// Planning / rubric headers. Optional leading markdown decoration
/// (`**`, `#`, `>`, `-`) is tolerated.
static PLANNING_HEADER_RULES: LazyLock<Vec<LineRule>> = LazyLock::new(|| {
    vec![
        line_rule("thought", r"(?i)^[\s*#>_-]*thought[\s*_:]*$"),
        line_rule("final-plan", r"(?i)^[\s*#>_-]*final\s+plan[\s*_]*:"),
        line_rule("constraint-checklist", r"(?i)^[\s*#>_-]*constraint\s+checklist"),
        line_rule("confidence-score", r"(?i)^[\s*#>_-]*confidence\s+score"),
        line_rule("mental-sandbox", r"(?i)^[\s*#>_-]*mental\s+sandbox"),
        line_rule("attempt-n", r"(?i)^[\s*#>_-]*attempt\s*\d+"),
        line_rule("define-header", r"(?i)^[\s*#>_-]*define\s.*:[\s*_]*$"),
        line_rule("optional-marker", r"(?i)^[\s*#>_-]*\(optional\)"),
        line_rule("refinement", r"(?i)^[\s*#>_-]*refinement[\s*_]*:"),
        line_rule("initial-thought", r"(?i)^[\s*#>_-]*initial\s+thought[\s*_]*:"),
        line_rule("final-check", r"(?i)^[\s*#>_-]*final\s+check"),
    ]
});

/// Meta-instruction vocabulary. A line containing one of these is only
/// dropped when it is also short or contains a colon.
static INSTRUCTION_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:do\s+not|avoid|constraint|checklist|plan|simulation)\b")
        .expect("valid regex")
});

/// Canonical disease-definition openers used to find where the real
/// answer starts.
static DEFINITION_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:diabetes\s+is\s+an?|cancer\s+is\s+an?|tuberculosis\s+is\s+an?|tb\s+is\s+an?|thyroid\s+(?:disease|problems|disorders)|a\s+thyroid)\b",
    )
    .expect("valid regex")
});

static OPEN_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFINAL_ANSWER:").expect("valid regex"));

static CLOSE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bEND_FINAL_ANSWER\b").expect("valid regex"));

static EXCESS_BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("valid regex"));

fn line_rule(id: &'static str, pattern: &str) -> LineRule {
    LineRule {
        id,
        regex: Regex::new(pattern).expect("Invalid line rule pattern"),
    }
}

/// The planning-header table, in evaluation order.
pub fn planning_header_rules() -> &'static [LineRule] {
    &PLANNING_HEADER_RULES
}

/// Id of the first rule that rejects `line`, if any.
pub fn rejecting_rule(line: &str, tuning: &ExtractionTuning) -> Option<&'static str> {
    if let Some(rule) = PLANNING_HEADER_RULES.iter().find(|r| r.matches(line)) {
        return Some(rule.id);
    }
    if is_meta_instruction(line, tuning) {
        return Some("instruction-keyword");
    }
    None
}

/// Keyword present AND (short OR has a colon). A long, colon-free medical
/// sentence that happens to say "avoid" is kept.
pub fn is_meta_instruction(line: &str, tuning: &ExtractionTuning) -> bool {
    if !INSTRUCTION_KEYWORD_RE.is_match(line) {
        return false;
    }
    line.contains(':') || line.trim().chars().count() < tuning.instruction_line_max_chars
}

/// Recover from a half-emitted marker pair.
///
/// Only called when no complete pair exists. An opening marker keeps the
/// text after it (the completion was cut off before the closing marker);
/// a lone closing marker keeps the text before it. Any marker literal left
/// over is removed.
pub fn recover_dangling_marker(text: &str) -> String {
    let body = if let Some(open) = OPEN_MARKER_RE.find(text) {
        &text[open.end()..]
    } else if let Some(close) = CLOSE_MARKER_RE.find(text) {
        &text[..close.start()]
    } else {
        return text.to_string();
    };

    let body = OPEN_MARKER_RE.replace_all(body, "");
    CLOSE_MARKER_RE.replace_all(&body, "").trim().to_string()
}

/// Cut everything before the first definition opener that starts a
/// sentence. A hit preceded by other words ("type 2 diabetes is a ...",
/// "Latent TB is a ...") is part of a longer subject and is not an opener,
/// whatever its case.
pub fn trim_to_definition_anchor(text: &str) -> &str {
    for m in DEFINITION_ANCHOR_RE.find_iter(text) {
        if opens_sentence(text, m.start()) {
            return text[m.start()..].trim();
        }
    }
    text
}

fn opens_sentence(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end_matches([' ', '\t']);
    match before.chars().last() {
        None => true,
        Some(c) => matches!(c, '\n' | '.' | '!' | '?' | ':' | '-' | '*' | '•' | '#' | '>'),
    }
}

/// Replace runs of two or more blank lines with a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_LINES_RE.replace_all(text, "\n\n").into_owned()
}

/// Run the full heuristic pass over normalized completion text.
pub fn clean_heuristically(text: &str, tuning: &ExtractionTuning) -> String {
    let recovered = recover_dangling_marker(text);

    let mut dropped = 0usize;
    let kept: Vec<&str> = recovered
        .lines()
        .filter(|line| match rejecting_rule(line, tuning) {
            Some(rule_id) => {
                tracing::trace!(rule_id, "Dropped planning line");
                dropped += 1;
                false
            }
            None => true,
        })
        .collect();

    let joined = kept.join("\n");
    let anchored = trim_to_definition_anchor(joined.trim());
    let cleaned = collapse_blank_lines(anchored).trim().to_string();

    tracing::debug!(
        dropped_lines = dropped,
        kept_lines = kept.len(),
        cleaned_len = cleaned.len(),
        "Heuristic answer cleanup"
    );

    cleaned
}

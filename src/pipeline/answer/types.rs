use serde::{Deserialize, Serialize};

/// Opening marker the output contract asks the model to emit.
pub const FINAL_ANSWER_OPEN: &str = "FINAL_ANSWER:";

/// Closing marker the output contract asks the model to emit.
pub const FINAL_ANSWER_CLOSE: &str = "END_FINAL_ANSWER";

/// Returned when every extraction stage leaves nothing to show.
pub const EXTRACTION_FALLBACK_MESSAGE: &str =
    "I'm unable to provide an answer to that question right now. \
     Please consult a healthcare professional for reliable medical guidance.";

/// Which stage produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPath {
    /// Text between `FINAL_ANSWER:` and `END_FINAL_ANSWER`.
    Marker,
    /// No complete marker pair; recovered by line filtering and anchor trim.
    Heuristic,
    /// Nothing survived; the fixed apology was returned.
    Fallback,
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marker => write!(f, "marker"),
            Self::Heuristic => write!(f, "heuristic"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A cleaned, user-facing answer. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAnswer {
    pub text: String,
    pub path: ExtractionPath,
}

impl ExtractedAnswer {
    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_fallback(&self) -> bool {
        self.path == ExtractionPath::Fallback
    }
}

/// Tuning knobs for the heuristic fallback.
///
/// The instruction-keyword filter drops a line containing a meta keyword
/// when it is shorter than `instruction_line_max_chars` (or has a colon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionTuning {
    pub instruction_line_max_chars: usize,
}

impl Default for ExtractionTuning {
    fn default() -> Self {
        Self {
            instruction_line_max_chars: 80,
        }
    }
}

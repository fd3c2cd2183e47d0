//! Answer extraction: turn a raw model completion into clean user-facing text.
//!
//! Stages run in a fixed order:
//! 0. normalize (trim, strip control tokens)
//! 1. marker extraction (`FINAL_ANSWER:` ... `END_FINAL_ANSWER`)
//! 2. heuristic cleanup when no complete marker pair exists
//! 3. empty guard, returning a fixed apology
//!
//! Every stage is a pure function of its input, so the extractor is
//! deterministic and safe to share across threads.

pub mod fallback;
pub mod markers;
pub mod normalize;
pub mod types;

pub use types::*;

use fallback::clean_heuristically;
use markers::extract_marked_answer;
use normalize::normalize_completion;

/// Stateless extractor carrying only its tuning.
#[derive(Debug, Clone, Default)]
pub struct AnswerExtractor {
    tuning: ExtractionTuning,
}

impl AnswerExtractor {
    pub fn new(tuning: ExtractionTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &ExtractionTuning {
        &self.tuning
    }

    /// Extract the answer from a raw completion. Total: never fails and
    /// never returns empty text.
    pub fn extract(&self, raw: &str) -> ExtractedAnswer {
        let normalized = normalize_completion(raw);

        let (text, path) = match extract_marked_answer(&normalized) {
            Some(body) => (body, ExtractionPath::Marker),
            None => (
                clean_heuristically(&normalized, &self.tuning),
                ExtractionPath::Heuristic,
            ),
        };

        let answer = if text.trim().is_empty() {
            ExtractedAnswer {
                text: EXTRACTION_FALLBACK_MESSAGE.to_string(),
                path: ExtractionPath::Fallback,
            }
        } else {
            ExtractedAnswer { text, path }
        };

        tracing::debug!(
            path = %answer.path,
            raw_len = raw.len(),
            answer_len = answer.text.len(),
            "Answer extracted"
        );
        answer
    }
}

//! Pre-generation safety gate.
//!
//! Questions are checked against an ordered table of named rules before
//! any prompt is built. Emergency rules run first, then restricted-request
//! rules; the first rule that matches decides the verdict. Every pattern is
//! anchored on word boundaries so "stroked" never trips the stroke rule.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{GateClass, SafetyVerdict};

/// A compiled gate rule.
pub struct GateRule {
    /// Stable identifier for the audit log.
    pub id: &'static str,
    pub class: GateClass,
    pub description: &'static str,
    regex: Regex,
}

impl GateRule {
    /// Whether this rule fires on an already-lowercased question.
    pub fn matches(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }
}

/// Rule table in evaluation order. Patterns are written in lowercase and
/// matched against the lowercased question.
static GATE_RULES: LazyLock<Vec<GateRule>> = LazyLock::new(|| {
    let mut rules = vec![
        // ── Emergency indicators ────────────────────────────
        rule(
            "EMG-001",
            GateClass::Emergency,
            r"\bchest\s+pains?\b",
            "Acute symptom: chest pain",
        ),
        rule(
            "EMG-002",
            GateClass::Emergency,
            r"\bdifficulty\s+breathing\b",
            "Acute symptom: difficulty breathing",
        ),
        rule(
            "EMG-003",
            GateClass::Emergency,
            r"\bunconscious(?:ness)?\b",
            "Acute symptom: loss of consciousness",
        ),
        rule(
            "EMG-004",
            GateClass::Emergency,
            r"\bseizures?\b",
            "Acute symptom: seizure",
        ),
        rule(
            "EMG-005",
            GateClass::Emergency,
            r"\bstrokes?\b",
            "Acute symptom: stroke",
        ),
        // ── Restricted requests (dosing / prescriptions) ────
        rule(
            "RX-001",
            GateClass::RestrictedRequest,
            r"\bdosages?\b",
            "Dosing request: 'dosage'",
        ),
        rule(
            "RX-002",
            GateClass::RestrictedRequest,
            r"\bdoses?\b",
            "Dosing request: 'dose'",
        ),
        rule(
            "RX-003",
            GateClass::RestrictedRequest,
            r"\bhow\s+many\s+(?:mg|milligrams?)\b",
            "Dosing request: 'how many mg'",
        ),
        rule(
            "RX-004",
            GateClass::RestrictedRequest,
            r"\bprescrib(?:e|es|ed|ing)\b",
            "Prescription request: 'prescribe'",
        ),
        rule(
            "RX-005",
            GateClass::RestrictedRequest,
            r"\bprescriptions?\b",
            "Prescription request: 'prescription'",
        ),
    ];
    // Stable sort keeps declaration order inside each class.
    rules.sort_by_key(|r| r.class);
    rules
});

fn rule(
    id: &'static str,
    class: GateClass,
    pattern: &str,
    description: &'static str,
) -> GateRule {
    GateRule {
        id,
        class,
        description,
        regex: Regex::new(pattern).expect("Invalid gate regex pattern"),
    }
}

/// The gate's rule table, in evaluation order.
pub fn gate_rules() -> &'static [GateRule] {
    &GATE_RULES
}

/// Classify a raw question. Pure and total: an unmatched question is
/// simply `Allowed`.
pub fn classify_question(question: &str) -> SafetyVerdict {
    let normalized = question.to_lowercase();

    match GATE_RULES.iter().find(|r| r.matches(&normalized)) {
        Some(rule) => {
            tracing::debug!(rule_id = rule.id, reason = rule.description, "Safety gate matched");
            rule.class.verdict(rule.id)
        }
        None => SafetyVerdict::Allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::safety::types::{EMERGENCY_MESSAGE, RESTRICTED_REQUEST_MESSAGE};

    fn rule_by_id(id: &str) -> &'static GateRule {
        gate_rules().iter().find(|r| r.id == id).unwrap()
    }

    fn fired_rule(question: &str) -> Option<&'static str> {
        classify_question(question).rule_id()
    }

    // ── Verdict classes ─────────────────────────────────────

    #[test]
    fn chest_pain_is_emergency() {
        let verdict = classify_question("I have chest pain");
        assert!(matches!(verdict, SafetyVerdict::Emergency { .. }));
        assert_eq!(verdict.blocking_message(), Some(EMERGENCY_MESSAGE));
    }

    #[test]
    fn dosage_question_is_restricted() {
        let verdict = classify_question("what dosage of ibuprofen should I take?");
        assert!(matches!(verdict, SafetyVerdict::RestrictedRequest { .. }));
        assert_eq!(verdict.blocking_message(), Some(RESTRICTED_REQUEST_MESSAGE));
    }

    #[test]
    fn general_question_is_allowed() {
        assert_eq!(classify_question("what is diabetes?"), SafetyVerdict::Allowed);
        assert_eq!(
            classify_question("How is tuberculosis transmitted?"),
            SafetyVerdict::Allowed
        );
    }

    #[test]
    fn empty_question_is_allowed() {
        assert_eq!(classify_question(""), SafetyVerdict::Allowed);
        assert_eq!(classify_question("   "), SafetyVerdict::Allowed);
    }

    // ── Priority ────────────────────────────────────────────

    #[test]
    fn emergency_wins_over_restricted() {
        let verdict = classify_question("What dose of aspirin for chest pain?");
        assert!(matches!(verdict, SafetyVerdict::Emergency { .. }));
        assert_eq!(verdict.rule_id(), Some("EMG-001"));
    }

    #[test]
    fn first_declared_rule_wins_within_class() {
        // Both RX-001 (dosage) and RX-002 (dose) are present.
        assert_eq!(fired_rule("dose and dosage"), Some("RX-001"));
    }

    #[test]
    fn table_is_ordered_emergency_first() {
        let classes: Vec<GateClass> = gate_rules().iter().map(|r| r.class).collect();
        let mut sorted = classes.clone();
        sorted.sort();
        assert_eq!(classes, sorted);
        assert_eq!(gate_rules()[0].class, GateClass::Emergency);
    }

    #[test]
    fn rule_ids_are_unique() {
        let mut ids: Vec<&str> = gate_rules().iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), gate_rules().len());
    }

    // ── Word boundaries ─────────────────────────────────────

    #[test]
    fn stroked_does_not_trigger_stroke_rule() {
        assert_eq!(
            classify_question("My cat stroked my hand, is that a sign of affection?"),
            SafetyVerdict::Allowed
        );
    }

    #[test]
    fn stroke_and_strokes_trigger() {
        assert_eq!(fired_rule("signs of a stroke"), Some("EMG-005"));
        assert_eq!(fired_rule("can strokes run in families"), Some("EMG-005"));
    }

    #[test]
    fn dose_inside_other_words_is_ignored() {
        // "dosed" and "doser" must not match the bare dose rule.
        assert!(!rule_by_id("RX-002").matches("he dosed off"));
        assert!(!rule_by_id("RX-002").matches("doser"));
        assert!(rule_by_id("RX-002").matches("a single dose"));
    }

    #[test]
    fn prescriber_is_not_prescribe() {
        assert!(!rule_by_id("RX-004").matches("ask the prescriber"));
        assert!(rule_by_id("RX-004").matches("can you prescribe something"));
        assert!(rule_by_id("RX-004").matches("what is usually prescribed"));
    }

    #[test]
    fn seizures_plural_matches() {
        assert_eq!(fired_rule("what causes seizures"), Some("EMG-004"));
    }

    // ── Each rule independently ─────────────────────────────

    #[test]
    fn each_emergency_rule_fires_on_its_term() {
        let cases = [
            ("EMG-001", "sharp chest pain since morning"),
            ("EMG-002", "my father has difficulty breathing"),
            ("EMG-003", "she was unconscious for a minute"),
            ("EMG-003", "brief unconsciousness after a fall"),
            ("EMG-004", "he had a seizure"),
            ("EMG-005", "is this a stroke"),
        ];
        for (id, text) in cases {
            assert!(rule_by_id(id).matches(text), "{id} should match: {text}");
            assert_eq!(fired_rule(text), Some(id), "first match for: {text}");
        }
    }

    #[test]
    fn each_restricted_rule_fires_on_its_term() {
        let cases = [
            ("RX-001", "what is the dosage"),
            ("RX-002", "what dose is safe"),
            ("RX-003", "how many mg of paracetamol"),
            ("RX-004", "please prescribe antibiotics"),
            ("RX-005", "do I need a prescription"),
        ];
        for (id, text) in cases {
            assert!(rule_by_id(id).matches(text), "{id} should match: {text}");
            assert_eq!(fired_rule(text), Some(id), "first match for: {text}");
        }
    }

    // ── Normalization ───────────────────────────────────────

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(fired_rule("CHEST PAIN"), Some("EMG-001"));
        assert_eq!(fired_rule("Difficulty Breathing at night"), Some("EMG-002"));
        assert_eq!(fired_rule("How Many MG should I take"), Some("RX-003"));
    }

    #[test]
    fn multi_word_terms_tolerate_extra_whitespace() {
        assert_eq!(fired_rule("chest   pain"), Some("EMG-001"));
        assert_eq!(fired_rule("difficulty\nbreathing"), Some("EMG-002"));
    }

    #[test]
    fn classification_is_deterministic() {
        let questions = [
            "I have chest pain",
            "what dosage of ibuprofen should I take?",
            "what is diabetes?",
        ];
        for q in questions {
            assert_eq!(classify_question(q), classify_question(q));
        }
    }
}

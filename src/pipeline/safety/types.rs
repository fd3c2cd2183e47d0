use serde::Serialize;

/// Advisory returned instead of an answer when the question describes
/// acute, time-critical symptoms.
pub const EMERGENCY_MESSAGE: &str =
    "This may be a medical emergency. Please seek immediate medical attention \
     or contact your local emergency services.";

/// Returned instead of an answer when the question asks for dosing or
/// prescription advice.
pub const RESTRICTED_REQUEST_MESSAGE: &str =
    "I can't provide prescriptions or exact medication dosages. \
     Please consult a licensed healthcare professional.";

/// Outcome of the pre-generation safety gate.
///
/// Blocking variants carry the fixed user-facing message plus the id of
/// the rule that fired, so the audit log can say *why* without repeating
/// the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SafetyVerdict {
    /// Acute symptoms: short-circuit with an emergency advisory.
    Emergency {
        rule_id: &'static str,
        message: &'static str,
    },
    /// Dosing / prescription request: short-circuit with a decline.
    RestrictedRequest {
        rule_id: &'static str,
        message: &'static str,
    },
    /// Nothing matched; generation may proceed.
    Allowed,
}

impl SafetyVerdict {
    /// The fixed message to return instead of generating, if any.
    pub fn blocking_message(&self) -> Option<&'static str> {
        match self {
            SafetyVerdict::Emergency { message, .. }
            | SafetyVerdict::RestrictedRequest { message, .. } => Some(*message),
            SafetyVerdict::Allowed => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        !matches!(self, SafetyVerdict::Allowed)
    }

    /// Id of the rule that produced a blocking verdict.
    pub fn rule_id(&self) -> Option<&'static str> {
        match self {
            SafetyVerdict::Emergency { rule_id, .. }
            | SafetyVerdict::RestrictedRequest { rule_id, .. } => Some(*rule_id),
            SafetyVerdict::Allowed => None,
        }
    }
}

/// Which rule set a gate rule belongs to. Also fixes evaluation order:
/// every emergency rule is tried before any restricted rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateClass {
    Emergency,
    RestrictedRequest,
}

impl GateClass {
    pub fn verdict(self, rule_id: &'static str) -> SafetyVerdict {
        match self {
            GateClass::Emergency => SafetyVerdict::Emergency {
                rule_id,
                message: EMERGENCY_MESSAGE,
            },
            GateClass::RestrictedRequest => SafetyVerdict::RestrictedRequest {
                rule_id,
                message: RESTRICTED_REQUEST_MESSAGE,
            },
        }
    }
}

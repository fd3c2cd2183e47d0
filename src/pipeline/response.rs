use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attached to every response, blocked or answered.
pub const DISCLAIMER: &str = "This information is for educational purposes only \
                              and not a substitute for professional medical advice.";

/// Terminal value returned for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalResponse {
    pub request_id: Uuid,
    pub answer: String,
    pub disclaimer: String,
}

/// Combine an answer (or blocking message) with the request id and the
/// fixed disclaimer.
pub fn assemble(request_id: Uuid, answer: impl Into<String>) -> MedicalResponse {
    MedicalResponse {
        request_id,
        answer: answer.into(),
        disclaimer: DISCLAIMER.to_string(),
    }
}

use std::fmt;

/// Closing sentence every answer is asked to end with.
pub const CONSULTATION_REMINDER: &str = "Consult a healthcare professional for personalized advice.";

/// Fixed instruction block placed before every question.
pub const MEDICAL_OUTPUT_CONTRACT: &str = r#"You are a medical assistant. Follow these rules strictly:
1) Do NOT invent medical facts. If unsure, say you are not sure.
2) Prefer established medical classifications. Do NOT create new types (e.g., do not say 'Type 3 diabetes').
3) Provide concise, patient-friendly explanations.
Do NOT explain your reasoning, steps, plans, checks, or thought process.
4) Do NOT give prescriptions, dosing, or treatment plans.
Do NOT say that you are not qualified or that you cannot provide information.
When defining a disease, do NOT include symptoms unless the user explicitly asks for symptoms.
You MAY list common symptoms ONLY when the user explicitly asks for symptoms, in a general, educational, non-diagnostic manner.
5) End with: 'Consult a healthcare professional for personalized advice.'
6) Start the final answer with the word FINAL_ANSWER followed by a colon. End it with the word END_FINAL_ANSWER and write nothing after that."#;

/// The full text sent to the model: instruction block plus the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the generation prompt for a question. The question is inserted
/// verbatim; gating has already happened.
pub fn build_generation_prompt(question: &str) -> GenerationPrompt {
    GenerationPrompt(format!(
        "{MEDICAL_OUTPUT_CONTRACT}\n\nUser question: {question}"
    ))
}

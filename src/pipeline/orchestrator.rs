use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

use super::answer::AnswerExtractor;
use super::generation::{GenerationError, LlmGenerate};
use super::prompt::build_generation_prompt;
use super::response::{assemble, MedicalResponse};
use super::safety::classify_question;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Safety-gated answer pipeline.
///
/// Coordinates: gate → prompt → generate → extract → assemble. Blocked
/// questions never reach the generator.
pub struct MedicalAnswerPipeline<'a, G: LlmGenerate + ?Sized> {
    generator: &'a G,
    extractor: &'a AnswerExtractor,
}

impl<'a, G: LlmGenerate + ?Sized> MedicalAnswerPipeline<'a, G> {
    pub fn new(generator: &'a G, extractor: &'a AnswerExtractor) -> Self {
        Self {
            generator,
            extractor,
        }
    }

    /// Answer one question. The only error is a generation failure; every
    /// other path yields a non-empty answer.
    pub fn answer(
        &self,
        request_id: Uuid,
        question: &str,
    ) -> Result<MedicalResponse, PipelineError> {
        tracing::info!(
            %request_id,
            question_chars = question.chars().count(),
            "Question received"
        );

        let verdict = classify_question(question);
        if let Some(message) = verdict.blocking_message() {
            tracing::info!(
                %request_id,
                rule_id = verdict.rule_id().unwrap_or_default(),
                "Question blocked by safety gate"
            );
            return Ok(assemble(request_id, message));
        }

        let prompt = build_generation_prompt(question);
        let started = Instant::now();
        let raw = self.generator.generate(&prompt).map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Generation failed");
            e
        })?;

        let extracted = self.extractor.extract(&raw);
        if extracted.is_fallback() {
            tracing::warn!(%request_id, raw_len = raw.len(), "No usable answer in completion");
        }
        tracing::info!(
            %request_id,
            generation_ms = started.elapsed().as_millis() as u64,
            raw_len = raw.len(),
            path = %extracted.path,
            answer_len = extracted.text.len(),
            "Answer ready"
        );

        Ok(assemble(request_id, extracted.into_text()))
    }
}

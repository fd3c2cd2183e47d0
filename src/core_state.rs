//! Shared service state.
//!
//! `CoreState` is built once at startup and shared by handle between the
//! HTTP server and the one-shot CLI. It owns the long-lived generator and
//! the configured extractor; pipelines borrow from it per request.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServiceConfig;
use crate::pipeline::answer::AnswerExtractor;
use crate::pipeline::generation::{GenerationError, LlmGenerate, OllamaGenerator};
use crate::pipeline::MedicalAnswerPipeline;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    config: ServiceConfig,
    generator: Arc<dyn LlmGenerate>,
    extractor: AnswerExtractor,
    started_at: Instant,
}

impl CoreState {
    /// State backed by an explicit generator.
    pub fn new(config: ServiceConfig, generator: Arc<dyn LlmGenerate>) -> Self {
        let extractor = AnswerExtractor::new(config.extraction.clone());
        tracing::debug!(
            instruction_line_max_chars = extractor.tuning().instruction_line_max_chars,
            "Answer extractor configured"
        );
        Self {
            config,
            generator,
            extractor,
            started_at: Instant::now(),
        }
    }

    /// State backed by the Ollama generator described in `config`.
    ///
    /// Call outside any tokio runtime: the blocking HTTP client may not be
    /// created or dropped from async context.
    pub fn with_ollama(config: ServiceConfig) -> Result<Self, GenerationError> {
        let generator = OllamaGenerator::new(&config.generation)?;
        tracing::info!(
            backend = generator.backend(),
            model = generator.model(),
            url = generator.base_url(),
            "Generator configured"
        );
        Ok(Self::new(config, Arc::new(generator)))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn generator(&self) -> &dyn LlmGenerate {
        self.generator.as_ref()
    }

    pub fn extractor(&self) -> &AnswerExtractor {
        &self.extractor
    }

    /// A pipeline borrowing this state's generator and extractor.
    pub fn pipeline(&self) -> MedicalAnswerPipeline<'_, dyn LlmGenerate> {
        MedicalAnswerPipeline::new(self.generator.as_ref(), &self.extractor)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

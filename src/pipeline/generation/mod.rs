//! Generation adapter boundary.
//!
//! The pipeline only sees `LlmGenerate`: prompt in, raw completion out.
//! The concrete adapter is constructed once at startup and shared by
//! handle; a counting mock stands in for it in tests.

pub mod ollama;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use crate::pipeline::prompt::GenerationPrompt;

pub use ollama::OllamaGenerator;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation backend not reachable at {0}")]
    Connection(String),

    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    #[error("Generation backend returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),
}

/// Text generation capability used by the answer pipeline.
///
/// Implementations are blocking; async callers run them on the blocking
/// thread pool.
pub trait LlmGenerate: Send + Sync {
    /// Run one completion for `prompt` and return the raw text.
    fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError>;

    /// Model identifier reported to clients.
    fn model(&self) -> &str;

    /// Short backend name for diagnostics ("ollama", "mock").
    fn backend(&self) -> &str;

    /// Whether the backend is reachable and the model is installed.
    fn is_ready(&self) -> Result<bool, GenerationError>;
}

/// Mock generator for testing. Returns a fixed completion and counts calls.
pub struct MockGenerator {
    response: String,
    model: String,
    ready: bool,
    fail: bool,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            model: "mock-medgemma".to_string(),
            ready: true,
            fail: false,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A generator whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn with_ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text of the most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|guard| guard.clone())
    }
}

impl LlmGenerate for MockGenerator {
    fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(prompt.as_str().to_string());
        }
        if self.fail {
            return Err(GenerationError::Connection("mock://unreachable".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn backend(&self) -> &str {
        "mock"
    }

    fn is_ready(&self) -> Result<bool, GenerationError> {
        if self.fail {
            return Err(GenerationError::Connection("mock://unreachable".to_string()));
        }
        Ok(self.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompt::build_generation_prompt;

    #[test]
    fn mock_returns_configured_response() {
        let mock = MockGenerator::new("FINAL_ANSWER: ok END_FINAL_ANSWER");
        let out = mock.generate(&build_generation_prompt("q")).unwrap();
        assert_eq!(out, "FINAL_ANSWER: ok END_FINAL_ANSWER");
    }

    #[test]
    fn mock_counts_calls_and_records_prompt() {
        let mock = MockGenerator::new("x");
        assert_eq!(mock.calls(), 0);
        assert!(mock.last_prompt().is_none());

        mock.generate(&build_generation_prompt("first")).unwrap();
        mock.generate(&build_generation_prompt("second")).unwrap();

        assert_eq!(mock.calls(), 2);
        assert!(mock.last_prompt().unwrap().ends_with("User question: second"));
    }

    #[test]
    fn failing_mock_reports_connection_error() {
        let mock = MockGenerator::failing();
        let err = mock.generate(&build_generation_prompt("q")).unwrap_err();
        assert!(matches!(err, GenerationError::Connection(_)));
        assert!(mock.is_ready().is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn mock_readiness_and_model_are_configurable() {
        let mock = MockGenerator::new("").with_ready(false).with_model("medgemma:4b");
        assert!(!mock.is_ready().unwrap());
        assert_eq!(mock.model(), "medgemma:4b");
        assert_eq!(mock.backend(), "mock");
    }

    #[test]
    fn generation_error_messages() {
        let err = GenerationError::Upstream {
            status: 404,
            body: "model not found".into(),
        };
        assert_eq!(err.to_string(), "Generation backend returned 404: model not found");
        assert_eq!(
            GenerationError::Timeout(300).to_string(),
            "Generation timed out after 300s"
        );
    }

    #[test]
    fn generator_is_object_safe() {
        let boxed: Box<dyn LlmGenerate> = Box::new(MockGenerator::new("x"));
        assert_eq!(boxed.backend(), "mock");
    }
}

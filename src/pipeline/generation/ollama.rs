use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::{GenerationError, LlmGenerate};
use crate::config::GenerationConfig;
use crate::pipeline::prompt::GenerationPrompt;

/// Ollama HTTP client for local MedGemma inference.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    options: GenerateOptions,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

/// Decoding options sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct GenerateOptions {
    temperature: f32,
    repeat_penalty: f32,
    num_predict: u32,
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaGenerator {
    /// Build a generator from the `[generation]` config section.
    ///
    /// Must be called outside an async context: the blocking client owns
    /// its own runtime.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: GenerateOptions {
                temperature: config.temperature,
                repeat_penalty: config.repeat_penalty,
                num_predict: config.num_predict,
            },
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of all models installed on the Ollama instance.
    pub fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            GenerationError::Timeout(self.timeout_secs)
        } else {
            GenerationError::Http(e.to_string())
        }
    }
}

/// `wanted` is installed if a tag equals it exactly or names one of its
/// variants ("medgemma" matches "medgemma:latest").
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || installed
            .strip_prefix(wanted)
            .is_some_and(|rest| rest.starts_with(':'))
}

impl LlmGenerate for OllamaGenerator {
    fn generate(&self, prompt: &GenerationPrompt) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: prompt.as_str(),
            stream: false,
            options: self.options,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        tracing::info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            completion_len = parsed.response.len(),
            "Ollama generation complete"
        );

        Ok(parsed.response)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn backend(&self) -> &str {
        "ollama"
    }

    fn is_ready(&self) -> Result<bool, GenerationError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| model_matches(m, &self.model)))
    }
}

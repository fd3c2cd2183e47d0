//! Service configuration.
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. global file `$XDG_CONFIG_HOME/medichat/config.toml`
//! 3. project file `./medichat.toml`
//! 4. explicit `--config <path>`
//! 5. environment `MEDICHAT_<SECTION>__<KEY>`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::answer::ExtractionTuning;

/// Application-level constants
pub const APP_NAME: &str = "MediChat";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "medichat";
pub const PROJECT_CONFIG_FILE: &str = "medichat.toml";
pub const ENV_PREFIX: &str = "MEDICHAT_";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medichat_lib=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub extraction: ExtractionTuning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Longer questions are rejected with 400.
    pub max_question_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_question_chars: 2000,
        }
    }
}

/// Ollama connection and decoding settings. Defaults give greedy,
/// repetition-damped decoding capped at 512 new tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub ollama_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub repeat_penalty: f32,
    pub num_predict: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model: "dcarrascosa/medgemma-1.5-4b-it".to_string(),
            timeout_secs: 300,
            temperature: 0.0,
            repeat_penalty: 1.1,
            num_predict: 512,
        }
    }
}

impl ServiceConfig {
    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_question_chars == 0 {
            return Err(invalid("server.max_question_chars", "must be greater than 0"));
        }
        if self.generation.model.trim().is_empty() {
            return Err(invalid("generation.model", "must not be empty"));
        }
        if !self.generation.ollama_url.starts_with("http://")
            && !self.generation.ollama_url.starts_with("https://")
        {
            return Err(invalid("generation.ollama_url", "must be an http(s) URL"));
        }
        if self.generation.timeout_secs == 0 {
            return Err(invalid("generation.timeout_secs", "must be greater than 0"));
        }
        if self.generation.num_predict == 0 {
            return Err(invalid("generation.num_predict", "must be greater than 0"));
        }
        if self.generation.temperature.is_nan() || self.generation.temperature < 0.0 {
            return Err(invalid("generation.temperature", "must be 0.0 or higher"));
        }
        if self.extraction.instruction_line_max_chars == 0 {
            return Err(invalid(
                "extraction.instruction_line_max_chars",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Configuration loader that merges every source in priority order.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate the configuration.
    pub fn load(explicit: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
        let config: ServiceConfig = Self::figment(explicit)?
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// The merged provider chain, before extraction.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ServiceConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                tracing::debug!(path = %global_path.display(), "Using global config");
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_path.exists() {
            tracing::debug!(path = %project_path.display(), "Using project config");
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// `$XDG_CONFIG_HOME/medichat/config.toml` (or the platform equivalent).
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    /// Point the global config dir into the jail so the host's own
    /// config never leaks into a test.
    fn isolate(jail: &mut Jail) {
        let dir = jail.directory().to_path_buf();
        jail.set_env("XDG_CONFIG_HOME", dir.display());
    }

    #[test]
    fn app_name_is_medichat() {
        assert_eq!(APP_NAME, "MediChat");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("medichat_lib=info"));
    }

    #[test]
    fn defaults_are_sensible() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.server.max_question_chars, 2000);
        assert_eq!(config.generation.ollama_url, "http://localhost:11434");
        assert_eq!(config.generation.model, "dcarrascosa/medgemma-1.5-4b-it");
        assert_eq!(config.generation.timeout_secs, 300);
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.repeat_penalty, 1.1);
        assert_eq!(config.generation.num_predict, 512);
        assert_eq!(config.extraction.instruction_line_max_chars, 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn global_config_path_names_app_dir() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("medichat/config.toml"));
    }

    #[test]
    fn load_without_files_gives_defaults() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config, ServiceConfig::default());
            Ok(())
        });
    }

    #[test]
    fn project_file_overrides_global_file() {
        Jail::expect_with(|jail| {
            isolate(jail);
            std::fs::create_dir_all(jail.directory().join("medichat")).unwrap();
            jail.create_file(
                "medichat/config.toml",
                r#"
                [generation]
                model = "global-model"
                num_predict = 256
                "#,
            )?;
            jail.create_file(
                "medichat.toml",
                r#"
                [generation]
                model = "project-model"
                "#,
            )?;

            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.generation.model, "project-model");
            assert_eq!(config.generation.num_predict, 256);
            assert_eq!(config.generation.timeout_secs, 300);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_files() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "medichat.toml",
                r#"
                [server]
                bind = "127.0.0.1:9000"
                max_question_chars = 500
                "#,
            )?;
            jail.set_env("MEDICHAT_SERVER__MAX_QUESTION_CHARS", "750");
            jail.set_env("MEDICHAT_EXTRACTION__INSTRUCTION_LINE_MAX_CHARS", "100");

            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.server.bind.port(), 9000);
            assert_eq!(config.server.max_question_chars, 750);
            assert_eq!(config.extraction.instruction_line_max_chars, 100);
            Ok(())
        });
    }

    #[test]
    fn explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("medichat.toml", "[generation]\ntimeout_secs = 60\n")?;

            let dir = tempfile::tempdir().unwrap();
            let explicit = dir.path().join("custom.toml");
            std::fs::write(&explicit, "[generation]\ntimeout_secs = 30\n").unwrap();

            let config = ConfigLoader::load(Some(&explicit)).unwrap();
            assert_eq!(config.generation.timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let err = ConfigLoader::load(Some(Path::new("does-not-exist.toml"))).unwrap_err();
            assert!(matches!(err, ConfigError::MissingFile(_)));
            assert!(err.to_string().contains("does-not-exist.toml"));
            Ok(())
        });
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("medichat.toml", "[server]\nmax_question_chars = \"lots\"\n")?;
            let err = ConfigLoader::load(None).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_limits_fail_validation() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("MEDICHAT_GENERATION__NUM_PREDICT", "0");
            let err = ConfigLoader::load(None).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    field: "generation.num_predict",
                    ..
                }
            ));
            Ok(())
        });
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.generation.ollama_url = "localhost:11434".into();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.generation.model = "  ".into();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.extraction.instruction_line_max_chars = 0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.generation.temperature = -0.5;
        assert!(config.validate().is_err());
    }
}

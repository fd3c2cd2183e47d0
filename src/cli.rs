//! Command-line definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for medichat
#[derive(Parser, Debug)]
#[command(name = "medichat")]
#[command(version, about = "Safety-gated medical question answering backed by a local MedGemma model")]
#[command(long_about = r#"
MediChat answers general medical questions through a local Ollama model.
Questions describing emergencies or asking for dosing and prescriptions
are answered with a fixed advisory and never reach the model.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/medichat/config.toml   Global config
2. ./medichat.toml                  Project-level config
3. --config <path>                  Explicit config file
4. MEDICHAT_<SECTION>__<KEY>        Environment overrides

Example:
  medichat serve --bind 0.0.0.0:8000
  medichat ask "What is tuberculosis?"
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP service (default)
    Serve {
        /// Address to listen on, overriding `server.bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Answer one question and print the JSON response
    Ask {
        /// The question to ask
        question: String,
    },
}

impl Cli {
    /// The subcommand to run; `serve` when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { bind: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["medichat"]);
        assert_eq!(cli.resolved_command(), Command::Serve { bind: None });
        assert!(cli.config.is_none());
    }

    #[test]
    fn serve_accepts_bind() {
        let cli = Cli::parse_from(["medichat", "serve", "--bind", "0.0.0.0:9000"]);
        assert_eq!(
            cli.resolved_command(),
            Command::Serve {
                bind: Some("0.0.0.0:9000".parse().unwrap())
            }
        );
    }

    #[test]
    fn ask_takes_question_and_global_config() {
        let cli = Cli::parse_from(["medichat", "ask", "What is TB?", "--config", "custom.toml"]);
        assert_eq!(
            cli.resolved_command(),
            Command::Ask {
                question: "What is TB?".into()
            }
        );
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn invalid_bind_is_rejected() {
        assert!(Cli::try_parse_from(["medichat", "serve", "--bind", "nope"]).is_err());
    }
}

pub mod api;
pub mod cli;
pub mod config;
pub mod core_state;
pub mod pipeline;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::api::{start_api_server, ServerError};
use crate::cli::{Cli, Command};
use crate::config::{ConfigError, ConfigLoader, ServiceConfig};
use crate::core_state::CoreState;
use crate::pipeline::generation::GenerationError;
use crate::pipeline::PipelineError;

/// Top-level failures that end the process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot create generator: {0}")]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Cannot start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("Cannot encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("Question exceeds {0} characters")]
    QuestionTooLong(usize),
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = execute(cli) {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), AppError> {
    let config = ConfigLoader::load(cli.config.as_deref())?;
    match cli.resolved_command() {
        Command::Serve { bind } => serve(config, bind),
        Command::Ask { question } => ask_once(config, &question),
    }
}

/// Validate a question the same way the HTTP layer does.
pub fn check_question(question: &str, max_chars: usize) -> Result<&str, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::EmptyQuestion);
    }
    if question.chars().count() > max_chars {
        return Err(AppError::QuestionTooLong(max_chars));
    }
    Ok(question)
}

fn ask_once(config: ServiceConfig, question: &str) -> Result<(), AppError> {
    let question = check_question(question, config.server.max_question_chars)?;
    let core = CoreState::with_ollama(config)?;
    let response = core.pipeline().answer(Uuid::new_v4(), question)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn serve(mut config: ServiceConfig, bind: Option<SocketAddr>) -> Result<(), AppError> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let addr = config.server.bind;

    // The blocking generator is created here and dropped after the runtime
    // is gone; neither may happen on a runtime thread.
    let core = Arc::new(CoreState::with_ollama(config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    runtime.block_on(async {
        let server = start_api_server(core.clone(), addr).await?;
        tracing::info!(
            addr = server.addr(),
            session_id = %server.session.session_id,
            model = core.generator().model(),
            "MediChat listening"
        );

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }

        tracing::info!(uptime_secs = core.uptime_secs(), "Shutting down");
        server.stop().await;
        Ok::<(), AppError>(())
    })?;

    drop(runtime);
    drop(core);
    Ok(())
}

//! StudyBot binary - composition root.
//!
//! 1. Parse CLI flags and resolve configuration (file, env, flags)
//! 2. Open the SQLite history store
//! 3. Build the completion client and chat orchestrator
//! 4. Serve the axum API until ctrl-c

mod cli;

use std::sync::Arc;

use clap::Parser;

use studybot_api::routes;
use studybot_api::state::AppState;
use studybot_chat::{ChatOrchestrator, OpenAiCompatClient, PromptAssembler};
use studybot_core::config::StudyBotConfig;
use studybot_storage::{Database, SqliteHistoryStore};

use cli::{CliArgs, ConfigSource};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let (mut config, source) = cli::load_config(&config_file);
    let rejected = config.apply_env_overrides();
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    tracing::info!("Starting StudyBot v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        ConfigSource::File => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        ConfigSource::Missing => tracing::info!(
            path = %config_file.display(),
            "No configuration file, using defaults"
        ),
        ConfigSource::Invalid(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Configuration file unusable, using defaults"
        ),
    }
    for r in &rejected {
        tracing::warn!(key = r.key, value = %r.value, reason = %r.reason, "Ignoring environment override");
    }

    if args.write_config {
        if let Err(e) = cli::write_config(&config_file, &source, &config) {
            tracing::error!(error = %e, "Configuration not written");
            return Err(e.into());
        }
        return Ok(());
    }

    // Storage.
    let db = Database::open(&config.storage.database_url)?;
    let store = Arc::new(SqliteHistoryStore::new(Arc::new(db))?);
    tracing::info!(database_url = %config.storage.database_url, "History store ready");

    // Completion provider.
    if config.provider.api_key.is_none() {
        tracing::warn!("No completion API key configured; set STUDYBOT_API_KEY or GROQ_API_KEY");
    }
    let client = Arc::new(OpenAiCompatClient::from_config(&config.provider));
    tracing::info!(
        base_url = %config.provider.base_url,
        model = %config.provider.model,
        timeout_secs = config.provider.timeout_secs,
        "Completion client ready"
    );

    let assembler = PromptAssembler::new(config.chat.system_instruction.clone())
        .with_max_history_turns(config.chat.max_history_turns);
    let orchestrator = ChatOrchestrator::new(store, client, assembler);

    // === API server ===

    let state = AppState::new(orchestrator);
    if let Err(e) = routes::start_server(&config.server, state, shutdown_signal()).await {
        tracing::error!(error = %e, "API server failed");
        return Err(e.into());
    }

    tracing::info!("StudyBot stopped");
    Ok(())
}

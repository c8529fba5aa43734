mod cli;
mod commands;
mod display;
mod kiosk;
mod setup;
mod terminal_avatar;

use std::process::ExitCode;
use std::sync::Arc;

use docent_common::{ConfigError, DocentError, EventBus};
use docent_config::schema::DocentConfig;
use docent_conversation::{ConversationOrchestrator, OrchestratorSettings};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::display::TerminalDisplay;

/// Read the config file, keeping parsed values when validation fails.
fn load_config(args: &Args) -> (DocentConfig, Vec<ConfigError>) {
    let loaded = match &args.config {
        Some(path) => docent_config::toml_loader::load_from_path(path),
        None => docent_config::toml_loader::load_default(),
    };

    let mut problems = Vec::new();
    let config = loaded.unwrap_or_else(|e| {
        problems.push(e);
        DocentConfig::default()
    });
    if let Err(e) = docent_config::validation::validate(&config) {
        problems.push(e);
    }
    (config, problems)
}

/// `RUST_LOG` wins, then `--log-level`, then `[logging] level`.
fn env_filter(args: &Args, config: &DocentConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = args
        .log_level
        .as_deref()
        .unwrap_or(config.logging.level.as_directive());
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn run(args: Args, config: DocentConfig) -> Result<(), DocentError> {
    let mut store = setup::open_store(&args, &config)?;

    match args.command {
        Some(Command::Key { action }) => commands::key(action, &config, &mut store).await,
        Some(Command::History { action }) => commands::history(action, &mut store),
        Some(Command::Ask { question }) => commands::ask(&question.join(" "), &config, store).await,
        Some(Command::Kiosk) | None => {
            let credential = commands::require_credential(&store)?;
            let client = setup::chat_client(&config.chat, &credential)
                .map_err(|e| DocentError::Chat(e.to_string()))?;

            let events = Arc::new(EventBus::default());
            let avatar_enabled = config.avatar.enabled && !args.no_avatar;
            let avatar = setup::avatar_session(&config.avatar, avatar_enabled, events);
            if avatar_enabled {
                if let Err(e) = avatar.initialize() {
                    tracing::warn!("avatar unavailable: {e}");
                }
            }

            let orch = ConversationOrchestrator::new(
                Arc::new(client),
                Arc::new(avatar),
                store,
                Box::new(TerminalDisplay::stdout()),
                OrchestratorSettings::from(&config.conversation),
            );
            kiosk::run(&orch, &config.conversation.preset_questions).await;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let args = cli::parse();
    let (config, problems) = load_config(&args);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&args, &config))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Docent v{} starting...", env!("CARGO_PKG_VERSION"));
    for problem in &problems {
        tracing::warn!("Config problem, continuing with loaded values: {problem}");
    }

    if let Err(e) = docent_platform::ensure_dirs() {
        tracing::warn!("Failed to create directories: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args, config)) {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("docent: {e}");
            ExitCode::FAILURE
        }
    }
}

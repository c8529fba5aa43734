//! Construction of the kiosk's collaborators from config and CLI flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use docent_ai::{ChatError, GlmClient, GlmConfig};
use docent_avatar::{AvatarRuntime, AvatarSdkOptions, AvatarSession};
use docent_common::{Credential, DocentError, EventBus};
use docent_config::schema::{AvatarConfig, ChatConfig, DocentConfig};
use docent_platform::{FileStore, PersistenceStore};
use tracing::info;

use crate::cli::Args;
use crate::terminal_avatar::TerminalRuntime;

const STORE_FILE_NAME: &str = "store.json";

/// Where the key-value store lives: `--data-dir`, then `[storage] path`,
/// then the platform data directory.
pub fn store_path(args: &Args, config: &DocentConfig) -> Result<PathBuf, DocentError> {
    if let Some(dir) = &args.data_dir {
        return Ok(dir.join(STORE_FILE_NAME));
    }
    if let Some(path) = &config.storage.path {
        return Ok(path.clone());
    }
    Ok(docent_platform::store_file()?)
}

pub fn open_store(args: &Args, config: &DocentConfig) -> Result<PersistenceStore<FileStore>, DocentError> {
    let path = store_path(args, config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let backend = FileStore::open(&path)?;
    info!(path = %path.display(), "store opened");
    Ok(PersistenceStore::new(backend))
}

pub fn chat_client(config: &ChatConfig, credential: &Credential) -> Result<GlmClient, ChatError> {
    GlmClient::new(
        GlmConfig::new(credential.key.clone())
            .with_api_url(config.api_url.clone())
            .with_model(config.model.clone())
            .with_timeouts(
                Duration::from_secs(config.connect_timeout_secs),
                Duration::from_secs(config.request_timeout_secs),
            ),
    )
}

pub fn sdk_options(config: &AvatarConfig) -> AvatarSdkOptions {
    AvatarSdkOptions {
        container_id: config.container_id.clone(),
        app_id: config.app_id.clone(),
        app_secret: config.app_secret.clone(),
        gateway_server: config.gateway_server.clone(),
        enable_logger: config.enable_logger,
    }
}

/// The avatar session, without a runtime when the avatar is disabled.
pub fn avatar_session(config: &AvatarConfig, enabled: bool, events: Arc<EventBus>) -> AvatarSession {
    let runtime: Option<Arc<dyn AvatarRuntime>> = if enabled {
        Some(Arc::new(TerminalRuntime))
    } else {
        None
    };
    AvatarSession::new(sdk_options(config), runtime, events)
        .with_pacing(Duration::from_millis(config.speak_pacing_ms))
        .with_volume(config.volume)
}

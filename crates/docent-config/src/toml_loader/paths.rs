//! Where `config.toml` lives, and writing the first-run template there.

use std::io;
use std::path::{Path, PathBuf};

use docent_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

const APP_DIR: &str = "docent";
const FILE_NAME: &str = "config.toml";

/// `<os config dir>/docent/config.toml`, e.g. `~/.config/docent/config.toml`
/// on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir()
        .ok_or_else(|| io::Error::other("no config directory on this platform"))?;
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

/// Write the commented template to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_toml())?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}

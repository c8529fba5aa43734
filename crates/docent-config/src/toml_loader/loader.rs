//! Reading `config.toml`. Validation is left to the caller, which decides
//! whether out-of-range values are fatal.

use std::io;
use std::path::Path;

use docent_common::ConfigError;
use tracing::info;

use super::paths::{create_default_config, default_config_path};
use crate::schema::DocentConfig;

/// Parse the file at `path`. Absent sections and fields take their defaults.
pub fn load_from_path(path: &Path) -> Result<DocentConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load the config from its default location. On first run the template is
/// written there and the defaults are returned.
pub fn load_default() -> Result<DocentConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(DocentConfig::default())
        }
        result => result,
    }
}

use std::fs;
use std::io;
use std::path::PathBuf;

const APP_NAME: &str = "docent";

fn unresolved(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("could not determine {what} directory"),
    )
}

/// Returns the platform-specific configuration directory for Docent.
///
/// - macOS: `~/Library/Application Support/docent`
/// - Linux: `$XDG_CONFIG_HOME/docent` (defaults to `~/.config/docent`)
/// - Windows: `%APPDATA%\docent`
pub fn config_dir() -> io::Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| unresolved("config"))
}

/// Returns the platform-specific data directory for Docent.
///
/// - macOS: `~/Library/Application Support/docent`
/// - Linux: `$XDG_DATA_HOME/docent` (defaults to `~/.local/share/docent`)
/// - Windows: `%APPDATA%\docent`
pub fn data_dir() -> io::Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| unresolved("data"))
}

/// Returns the path of the key-value store file, `data_dir()/store.json`.
pub fn store_file() -> io::Result<PathBuf> {
    Ok(data_dir()?.join("store.json"))
}

/// Creates the config and data directories if they do not already exist.
pub fn ensure_dirs() -> io::Result<()> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(data_dir()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_docent() {
        if let Ok(path) = config_dir() {
            assert!(path.ends_with("docent"), "got: {path:?}");
        }
    }

    #[test]
    fn data_dir_ends_with_docent() {
        if let Ok(path) = data_dir() {
            assert!(path.ends_with("docent"), "got: {path:?}");
        }
    }

    #[test]
    fn store_file_is_inside_data_dir() {
        if let (Ok(store), Ok(data)) = (store_file(), data_dir()) {
            assert!(store.starts_with(&data));
            assert_eq!(store.file_name().unwrap().to_str().unwrap(), "store.json");
        }
    }
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the underlying key-value storage. Never crosses the
/// persistence boundary; callers of the store only see a `bool`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("api key is empty")]
    Empty,

    #[error("api key format is invalid, expected `<id>.<secret>`")]
    InvalidFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum DocentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("chat error: {0}")]
    Chat(String),

    #[error("{0}")]
    Other(String),
}

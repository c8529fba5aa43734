pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, CredentialError, DocentError, StorageError};
pub use events::{Event, EventBus};
pub use id::{new_correlation_id, TurnId};
pub use types::{Credential, CredentialKind, Message, Role};

pub type Result<T> = std::result::Result<T, DocentError>;

//! Configuration schema types for Docent.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults of the reference kiosk.

mod avatar;
mod chat;
mod conversation;
mod system;

pub use avatar::*;
pub use chat::*;
pub use conversation::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Docent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocentConfig {
    pub chat: ChatConfig,
    pub avatar: AvatarConfig,
    pub conversation: ConversationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

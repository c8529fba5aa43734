//! Avatar SDK connection settings.

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub enabled: bool,
    pub app_id: String,
    pub app_secret: String,
    pub gateway_server: String,
    pub container_id: String,
    pub enable_logger: bool,
    /// Initial volume, 0.0-1.0.
    pub volume: f32,
    /// Delay between fragments of a streamed utterance.
    pub speak_pacing_ms: u64,
}

impl std::fmt::Debug for AvatarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarConfig")
            .field("enabled", &self.enabled)
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("gateway_server", &self.gateway_server)
            .field("container_id", &self.container_id)
            .field("enable_logger", &self.enable_logger)
            .field("volume", &self.volume)
            .field("speak_pacing_ms", &self.speak_pacing_ms)
            .finish()
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_id: String::new(),
            app_secret: String::new(),
            gateway_server: String::new(),
            container_id: "avatar-container".into(),
            enable_logger: true,
            volume: 0.8,
            speak_pacing_ms: 100,
        }
    }
}

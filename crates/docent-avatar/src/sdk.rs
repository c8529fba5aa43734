//! The external avatar SDK boundary.
//!
//! `AvatarRuntime` stands for the loaded SDK library, `AvatarSdk` for one
//! constructed instance, and `SdkListener` for the fixed set of callback
//! slots the instance reports through.

use std::fmt;
use std::sync::Arc;

/// Resource download progress, 0-100.
pub type ProgressCallback = Box<dyn Fn(u32) + Send + Sync>;

/// An exception raised by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SdkError(pub String);

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Model loading mode passed to `AvatarSdk::init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    #[default]
    Normal,
}

impl InitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
        }
    }
}

/// Construction parameters for an SDK instance.
#[derive(Clone, Default)]
pub struct AvatarSdkOptions {
    pub container_id: String,
    pub app_id: String,
    pub app_secret: String,
    pub gateway_server: String,
    pub enable_logger: bool,
}

impl fmt::Debug for AvatarSdkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarSdkOptions")
            .field("container_id", &self.container_id)
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("gateway_server", &self.gateway_server)
            .field("enable_logger", &self.enable_logger)
            .finish()
    }
}

/// Callback slots an SDK instance reports through.
pub trait SdkListener: Send + Sync {
    fn on_message(&self, message: &str);
    /// Raw avatar state, e.g. `"idle"`, `"listen"`, `"offline"`.
    fn on_state_change(&self, state: &str);
    /// `"start"` or `"end"` of an utterance.
    fn on_voice_state_change(&self, status: &str);
    fn on_error(&self, error: &str);
}

/// One constructed SDK instance.
pub trait AvatarSdk: Send + Sync {
    /// Start downloading resources. Completion is reported later through
    /// `SdkListener::on_state_change`, not through this call.
    fn init(&self, on_progress: ProgressCallback, mode: InitMode) -> Result<(), SdkError>;
    fn destroy(&self) -> Result<(), SdkError>;
    fn speak(&self, text: &str, is_start: bool, is_end: bool) -> Result<(), SdkError>;
    fn idle(&self) -> Result<(), SdkError>;
    fn listen(&self) -> Result<(), SdkError>;
    fn think(&self) -> Result<(), SdkError>;
    fn set_volume(&self, volume: f32) -> Result<(), SdkError>;
    fn show_debug_info(&self) -> Result<(), SdkError>;
    fn hide_debug_info(&self) -> Result<(), SdkError>;
    fn change_avatar_visible(&self, visible: bool) -> Result<(), SdkError>;
    fn switch_invisible_mode(&self) -> Result<(), SdkError>;
}

/// The SDK library itself.
pub trait AvatarRuntime: Send + Sync {
    fn create(
        &self,
        options: AvatarSdkOptions,
        listener: Arc<dyn SdkListener>,
    ) -> Result<Arc<dyn AvatarSdk>, SdkError>;
}

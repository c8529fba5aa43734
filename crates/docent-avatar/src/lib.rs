//! Avatar session for Docent.
//!
//! Wraps an external avatar-rendering SDK behind the `AvatarSdk` capability
//! interface. The session registers itself as the SDK's `SdkListener`,
//! derives a `SessionState` from the raw callback strings, and re-emits a
//! small set of events on the shared `EventBus`.

pub mod sdk;
pub mod session;
pub mod state;

pub use sdk::{AvatarRuntime, AvatarSdk, AvatarSdkOptions, InitMode, ProgressCallback, SdkError, SdkListener};
pub use session::AvatarSession;
pub use state::{next_state, next_voice_state, SessionState, Transition};

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("avatar SDK is not loaded")]
    SdkUnavailable,
    #[error("avatar SDK initialization failed: {0}")]
    InitError(String),
    #[error("avatar SDK instance not created")]
    NotInitialized,
    #[error("avatar is not connected")]
    NotConnected,
    #[error("avatar SDK error: {0}")]
    Sdk(String),
}

impl From<SdkError> for AvatarError {
    fn from(e: SdkError) -> Self {
        Self::Sdk(e.0)
    }
}

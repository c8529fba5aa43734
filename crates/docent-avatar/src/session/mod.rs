//! `AvatarSession` owns the SDK instance and the connection state derived
//! from its callbacks.

mod listener;

#[cfg(test)]
mod tests;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use docent_common::{Event, EventBus};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::sdk::{AvatarRuntime, AvatarSdk, AvatarSdkOptions, InitMode, ProgressCallback, SdkError};
use crate::state::SessionState;
use crate::AvatarError;

use listener::SessionShared;

pub const DEFAULT_VOLUME: f32 = 0.8;
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

pub struct AvatarSession {
    options: AvatarSdkOptions,
    runtime: Option<Arc<dyn AvatarRuntime>>,
    sdk: Mutex<Option<Arc<dyn AvatarSdk>>>,
    shared: Arc<SessionShared>,
    volume: Mutex<f32>,
    pacing: Duration,
}

impl AvatarSession {
    /// Create a session. `runtime` is `None` when the SDK library is not
    /// available; `initialize` then fails with `SdkUnavailable`.
    pub fn new(
        options: AvatarSdkOptions,
        runtime: Option<Arc<dyn AvatarRuntime>>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            options,
            runtime,
            sdk: Mutex::new(None),
            shared: Arc::new(SessionShared::new(events)),
            volume: Mutex::new(DEFAULT_VOLUME),
            pacing: DEFAULT_PACING,
        }
    }

    /// Delay after each streamed speech fragment.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Initial volume. Out-of-range values are ignored.
    pub fn with_volume(self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    /// Construct the SDK instance and register the session's callbacks.
    pub fn initialize(&self) -> Result<(), AvatarError> {
        let Some(runtime) = &self.runtime else {
            self.shared.publish_error(AvatarError::SdkUnavailable.to_string());
            return Err(AvatarError::SdkUnavailable);
        };

        let listener = self.shared.instance_listener();
        match runtime.create(self.options.clone(), listener.clone()) {
            Ok(sdk) => {
                info!(container = %self.options.container_id, "avatar SDK instance created");
                self.shared.adopt(&listener);
                *self.lock_sdk() = Some(sdk);
                Ok(())
            }
            Err(e) => {
                let err = AvatarError::InitError(e.0);
                self.shared.publish_error(err.to_string());
                Err(err)
            }
        }
    }

    /// Ask the SDK to download resources and bring the avatar up.
    ///
    /// Returns once the request is made; the connected state arrives later
    /// through the SDK's state callbacks. See `wait_connected`.
    pub fn connect(&self, on_progress: Option<ProgressCallback>) -> bool {
        if self.is_connected() {
            debug!("avatar already connected");
            return true;
        }

        let Some(sdk) = self.current_sdk() else {
            self.shared.publish_error(AvatarError::NotInitialized.to_string());
            return false;
        };

        info!("connecting avatar");
        let previous = self.shared.state.send_replace(SessionState::Connecting);

        let events = Arc::clone(&self.shared.events);
        let progress: ProgressCallback = Box::new(move |percent| {
            debug!(percent, "avatar resource load progress");
            events.publish(Event::LoadProgress(percent));
            if let Some(cb) = &on_progress {
                cb(percent);
            }
        });

        match sdk.init(progress, InitMode::Normal) {
            Ok(()) => true,
            Err(e) => {
                self.shared.state.send_if_modified(|state| {
                    if *state == SessionState::Connecting {
                        *state = previous;
                        true
                    } else {
                        false
                    }
                });
                self.shared
                    .publish_error(format!("avatar initialization failed: {e}"));
                false
            }
        }
    }

    /// Resolve once the session is connected.
    pub async fn wait_connected(&self) {
        let mut rx = self.shared.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| state.is_connected()).await;
    }

    /// Tear down the SDK instance. Local state is reset and a disconnect
    /// event published even when teardown fails. Callbacks still in flight
    /// from the torn-down instance no longer affect the session.
    pub fn disconnect(&self) {
        if self.state() == SessionState::Disconnected {
            debug!("avatar already disconnected");
            return;
        }

        info!("disconnecting avatar");
        self.shared.state.send_replace(SessionState::Disconnected);
        self.shared.retire_instance();

        if let Some(sdk) = self.lock_sdk().take() {
            if let Err(e) = sdk.destroy() {
                self.shared.publish_error(format!("avatar teardown failed: {e}"));
            }
        }

        self.shared.events.publish(Event::AvatarDisconnected);
    }

    /// Speak one complete utterance.
    pub fn speak(&self, text: &str, interactive: bool) -> bool {
        let Some(sdk) = self.connected_sdk() else {
            warn!("speak requested while avatar is not connected");
            self.shared.publish_error(AvatarError::NotConnected.to_string());
            return false;
        };

        debug!(interactive, chars = text.chars().count(), "avatar speak");
        match sdk.speak(text, true, true) {
            Ok(()) => true,
            Err(e) => {
                self.shared.publish_error(format!("speak failed: {e}"));
                false
            }
        }
    }

    /// Speak an utterance in fragments, pausing after each one.
    pub async fn speak_stream<S: AsRef<str>>(&self, chunks: &[S]) -> bool {
        let Some(sdk) = self.connected_sdk() else {
            warn!("speak requested while avatar is not connected");
            self.shared.publish_error(AvatarError::NotConnected.to_string());
            return false;
        };

        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(e) = sdk.speak(chunk.as_ref(), i == 0, i == last) {
                self.shared.publish_error(format!("streamed speak failed: {e}"));
                return false;
            }
            tokio::time::sleep(self.pacing).await;
        }
        true
    }

    pub fn idle(&self) {
        self.pose("idle", |sdk| sdk.idle());
    }

    pub fn listen(&self) {
        self.pose("listen", |sdk| sdk.listen());
    }

    pub fn think(&self) {
        self.pose("think", |sdk| sdk.think());
    }

    pub fn show_debug_info(&self) {
        self.pose("show_debug_info", |sdk| sdk.show_debug_info());
    }

    pub fn hide_debug_info(&self) {
        self.pose("hide_debug_info", |sdk| sdk.hide_debug_info());
    }

    pub fn set_avatar_visible(&self, visible: bool) {
        self.pose("change_avatar_visible", |sdk| sdk.change_avatar_visible(visible));
    }

    pub fn switch_invisible_mode(&self) {
        self.pose("switch_invisible_mode", |sdk| sdk.switch_invisible_mode());
    }

    /// Store a new volume and apply it if connected. Values outside 0..=1
    /// are rejected.
    pub fn set_volume(&self, volume: f32) -> bool {
        if !(0.0..=1.0).contains(&volume) {
            warn!(volume, "volume must be between 0 and 1");
            return false;
        }

        *self.volume.lock().unwrap_or_else(|e| e.into_inner()) = volume;
        self.apply_volume();
        true
    }

    /// Push the stored volume to the SDK, e.g. after a reconnect.
    pub fn apply_volume(&self) {
        let Some(sdk) = self.connected_sdk() else {
            return;
        };
        let volume = self.volume();
        if let Err(e) = sdk.set_volume(volume) {
            self.shared.publish_error(format!("set volume failed: {e}"));
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.current()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == SessionState::Speaking
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_sdk().is_some()
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.shared.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    fn pose(&self, name: &str, call: impl FnOnce(&dyn AvatarSdk) -> Result<(), SdkError>) {
        let Some(sdk) = self.connected_sdk() else {
            warn!(request = name, "avatar is not connected");
            return;
        };
        if let Err(e) = call(sdk.as_ref()) {
            self.shared.publish_error(format!("{name} failed: {e}"));
        }
    }

    fn connected_sdk(&self) -> Option<Arc<dyn AvatarSdk>> {
        if !self.is_connected() {
            return None;
        }
        self.current_sdk()
    }

    fn current_sdk(&self) -> Option<Arc<dyn AvatarSdk>> {
        self.lock_sdk().clone()
    }

    fn lock_sdk(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn AvatarSdk>>> {
        self.sdk.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for AvatarSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSession")
            .field("options", &self.options)
            .field("state", &self.state())
            .field("initialized", &self.is_initialized())
            .field("volume", &self.volume())
            .finish()
    }
}

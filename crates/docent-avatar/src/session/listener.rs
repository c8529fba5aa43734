//! SDK callbacks: derive the session state and re-emit events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use docent_common::{Event, EventBus};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::sdk::SdkListener;
use crate::state::{next_state, next_voice_state, SessionState, Transition};

/// State shared between the session and the callbacks it registers with
/// the SDK. Only these callbacks (and the session's own connect and
/// disconnect) write the state.
pub(crate) struct SessionShared {
    pub(crate) state: watch::Sender<SessionState>,
    pub(crate) events: Arc<EventBus>,
    /// Generation of the SDK instance whose callbacks are honoured.
    generation: AtomicU64,
}

impl SessionShared {
    pub(crate) fn new(events: Arc<EventBus>) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            state,
            events,
            generation: AtomicU64::new(0),
        }
    }

    /// Retire the current SDK instance. Callbacks it delivers from now on
    /// are dropped.
    pub(crate) fn retire_instance(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Listener for the next SDK instance. Its callbacks count only after
    /// `adopt`, which also retires the previous instance.
    pub(crate) fn instance_listener(self: &Arc<Self>) -> Arc<InstanceListener> {
        Arc::new(InstanceListener {
            shared: Arc::clone(self),
            generation: self.generation.load(Ordering::Acquire) + 1,
        })
    }

    pub(crate) fn adopt(&self, listener: &InstanceListener) {
        self.generation.store(listener.generation, Ordering::Release);
    }

    pub(crate) fn current(&self) -> SessionState {
        *self.state.borrow()
    }

    pub(crate) fn publish_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("avatar error: {message}");
        self.events.publish(Event::AvatarError(message));
    }
}

impl SdkListener for SessionShared {
    fn on_message(&self, message: &str) {
        debug!("avatar SDK message: {message}");
        self.events.publish(Event::AvatarMessage(message.to_string()));
    }

    fn on_state_change(&self, raw: &str) {
        debug!(state = raw, "avatar SDK state change");

        let mut transition = None;
        self.state.send_if_modified(|state| {
            let (next, edge) = next_state(*state, raw);
            transition = edge;
            let changed = next != *state;
            *state = next;
            changed
        });

        match transition {
            Some(Transition::Connected) => {
                info!("avatar connected");
                self.events.publish(Event::AvatarConnected);
            }
            Some(Transition::Disconnected) => {
                info!("avatar went offline");
                self.events.publish(Event::AvatarDisconnected);
            }
            None => {}
        }

        self.events
            .publish(Event::AvatarStateChanged(raw.to_string()));
    }

    fn on_voice_state_change(&self, status: &str) {
        debug!(status, "avatar voice state change");

        let mut speaking = false;
        let changed = self.state.send_if_modified(|state| {
            let next = next_voice_state(*state, status);
            speaking = next == SessionState::Speaking;
            let changed = next != *state;
            *state = next;
            changed
        });

        if changed {
            self.events.publish(Event::AvatarSpeaking(speaking));
        }
    }

    fn on_error(&self, error: &str) {
        self.publish_error(error);
    }
}

/// The callbacks registered with one SDK instance. Once the session tears
/// that instance down or replaces it, its late callbacks are ignored.
pub(crate) struct InstanceListener {
    shared: Arc<SessionShared>,
    generation: u64,
}

impl InstanceListener {
    fn current(&self) -> Option<&SessionShared> {
        if self.shared.generation.load(Ordering::Acquire) == self.generation {
            Some(&self.shared)
        } else {
            debug!(generation = self.generation, "ignoring callback from retired avatar instance");
            None
        }
    }
}

impl SdkListener for InstanceListener {
    fn on_message(&self, message: &str) {
        if let Some(shared) = self.current() {
            shared.on_message(message);
        }
    }

    fn on_state_change(&self, state: &str) {
        if let Some(shared) = self.current() {
            shared.on_state_change(state);
        }
    }

    fn on_voice_state_change(&self, status: &str) {
        if let Some(shared) = self.current() {
            shared.on_voice_state_change(status);
        }
    }

    fn on_error(&self, error: &str) {
        if let Some(shared) = self.current() {
            shared.on_error(error);
        }
    }
}

//! Session state and its derivation from raw SDK callback strings.
//!
//! Every raw state other than `"offline"` counts as connected. This lumps
//! all of the SDK's substates (including transient error states) into one
//! bucket.

use std::fmt;

pub const OFFLINE: &str = "offline";
pub const VOICE_START: &str = "start";
pub const VOICE_END: &str = "end";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Speaking,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Speaking)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Speaking => "speaking",
        };
        f.write_str(s)
    }
}

/// Connection edge produced by a raw state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Connected,
    Disconnected,
}

/// Apply one raw SDK state to the current session state.
pub fn next_state(current: SessionState, raw: &str) -> (SessionState, Option<Transition>) {
    if raw.is_empty() {
        return (current, None);
    }

    if raw == OFFLINE {
        return match current {
            SessionState::Connected | SessionState::Speaking => {
                (SessionState::Disconnected, Some(Transition::Disconnected))
            }
            SessionState::Connecting => (SessionState::Disconnected, None),
            SessionState::Disconnected => (current, None),
        };
    }

    match current {
        SessionState::Disconnected | SessionState::Connecting => {
            (SessionState::Connected, Some(Transition::Connected))
        }
        SessionState::Connected | SessionState::Speaking => (current, None),
    }
}

/// Apply one voice status (`"start"` / `"end"`) to the current state.
pub fn next_voice_state(current: SessionState, status: &str) -> SessionState {
    match (current, status) {
        (SessionState::Connected, VOICE_START) => SessionState::Speaking,
        (SessionState::Speaking, VOICE_END) => SessionState::Connected,
        _ => current,
    }
}

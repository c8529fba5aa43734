//! The kiosk's visible surface, as seen by the orchestrator.

use std::fmt;

use docent_common::Role;

/// Connection indicator shown next to the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
    Speaking,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online => "已连接",
            Self::Offline => "未连接",
            Self::Speaking => "讲解中",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub trait DisplaySink: Send {
    fn append_message(&mut self, role: Role, content: &str);

    /// Replace the text of the newest assistant message, appending one if
    /// none is shown yet.
    fn update_assistant_message(&mut self, content: &str);

    fn show_loading(&mut self, text: &str);
    fn hide_loading(&mut self);
    fn set_connection_status(&mut self, status: ConnectionStatus);
    fn clear_input(&mut self);
}

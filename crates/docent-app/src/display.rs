//! Terminal rendering of the kiosk conversation.

use std::io::{self, Write};

use chrono::Local;
use colored::Colorize;
use docent_common::Role;
use docent_conversation::{ConnectionStatus, DisplaySink};

/// Prints the conversation as timestamped lines. Streamed assistant text is
/// written incrementally on the current line.
pub struct TerminalDisplay<W: Write + Send = io::Stdout> {
    out: W,
    /// Text of the assistant line still being streamed.
    streaming: Option<String>,
}

impl TerminalDisplay {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            streaming: None,
        }
    }

    fn finish_stream(&mut self) {
        if self.streaming.take().is_some() {
            let _ = writeln!(self.out);
        }
    }

    fn prefix(role: Role) -> String {
        let time = Local::now().format("%H:%M:%S").to_string();
        let tag = match role {
            Role::User => "👤 您".bright_blue().bold(),
            Role::Assistant => "🤖 讲解员".bright_green().bold(),
            Role::System => "ℹ️ 系统".yellow().bold(),
        };
        format!("{} {tag}: ", time.bright_black())
    }

    fn line(&mut self, text: &str) {
        self.finish_stream();
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn append_message(&mut self, role: Role, content: &str) {
        self.finish_stream();
        let prefix = Self::prefix(role);
        if role == Role::Assistant && content.is_empty() {
            let _ = write!(self.out, "{prefix}");
            self.streaming = Some(String::new());
        } else {
            let _ = writeln!(self.out, "{prefix}{content}");
        }
        let _ = self.out.flush();
    }

    fn update_assistant_message(&mut self, content: &str) {
        let extended = match &mut self.streaming {
            Some(shown) if content.starts_with(shown.as_str()) => {
                let _ = write!(self.out, "{}", &content[shown.len()..]);
                *shown = content.to_string();
                true
            }
            _ => false,
        };
        if !extended {
            self.finish_stream();
            let _ = write!(self.out, "{}{content}", Self::prefix(Role::Assistant));
            self.streaming = Some(content.to_string());
        }
        let _ = self.out.flush();
    }

    fn show_loading(&mut self, text: &str) {
        if self.streaming.is_none() {
            self.line(&format!("⏳ {}", text.bright_black()));
        }
    }

    fn hide_loading(&mut self) {
        self.finish_stream();
    }

    fn set_connection_status(&mut self, status: ConnectionStatus) {
        let label = match status {
            ConnectionStatus::Online => status.label().green(),
            ConnectionStatus::Offline => status.label().red(),
            ConnectionStatus::Speaking => status.label().cyan(),
        };
        self.line(&format!("● 数字人状态: {label}"));
    }

    fn clear_input(&mut self) {}
}

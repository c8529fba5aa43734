//! Conversation orchestration for Docent.
//!
//! Sequences one question turn across the chat client, the avatar session,
//! the display surface and persistent storage.

pub mod display;
pub mod history;
pub mod orchestrator;

pub use display::{ConnectionStatus, DisplaySink};
pub use history::ConversationHistory;
pub use orchestrator::{ConversationOrchestrator, OrchestratorSettings};

use docent_ai::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("a question is already being answered")]
    Busy,
    #[error("question is empty")]
    EmptyInput,
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("no preset question #{0}")]
    UnknownPreset(usize),
}

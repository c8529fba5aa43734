//! Chat-completion client for Docent.
//!
//! Provides the `AiClient` abstraction and a GLM (OpenAI-compatible)
//! implementation with:
//! - single-shot requests
//! - SSE streaming with per-chunk callbacks
//! - question composition around a fixed system prompt

pub mod glm;
pub mod streaming;

use async_trait::async_trait;

pub use docent_common::{Message, Role};
pub use glm::{GlmClient, GlmConfig};

/// Receives `(delta, accumulated_so_far)` for every streamed chunk.
pub type ChunkCallback<'a> = dyn FnMut(&str, &str) + Send + 'a;

#[async_trait]
pub trait AiClient: Send + Sync {
    /// One blocking request carrying the full message list.
    async fn send_message(&self, messages: &[Message]) -> Result<String, ChatError>;

    /// One streaming request; returns the accumulated text once the stream
    /// ends. Chunks already delivered are not rolled back on failure.
    async fn send_message_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut ChunkCallback<'_>,
    ) -> Result<String, ChatError>;

    /// Ask `question` after `history`, framed by `system_prompt`. Streams
    /// when a chunk callback is supplied.
    async fn ask_question(
        &self,
        question: &str,
        system_prompt: &str,
        history: &[Message],
        on_chunk: Option<&mut ChunkCallback<'_>>,
    ) -> Result<String, ChatError> {
        let messages = compose_messages(system_prompt, history, question);
        match on_chunk {
            Some(on_chunk) => self.send_message_stream(&messages, on_chunk).await,
            None => self.send_message(&messages).await,
        }
    }

    /// Probe the endpoint with a tiny conversation. Any failure is `false`.
    async fn test_api_key(&self) -> bool {
        let ping = [
            Message::system("You are a test assistant."),
            Message::user("Hello"),
        ];
        match self.send_message(&ping).await {
            Ok(answer) => !answer.is_empty(),
            Err(e) => {
                tracing::warn!("api key test failed: {e}");
                false
            }
        }
    }
}

/// `[system, ...history, user:question]`
pub fn compose_messages(system_prompt: &str, history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend_from_slice(history);
    messages.push(Message::user(question));
    messages
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API key is not configured")]
    Auth,
    #[error("API error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Network error: {0}")]
    Network(String),
}

//! In-memory conversation history.
//!
//! The first message is always the system prompt. After it come
//! user/assistant exchanges, at most `max_rounds` of them once a turn
//! completes; the oldest exchanges are dropped first.

use docent_common::{Message, Role};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    max_rounds: usize,
}

impl ConversationHistory {
    pub fn new(system_prompt: impl Into<String>, max_rounds: usize) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            max_rounds,
        }
    }

    /// Rebuild a history read back from storage.
    ///
    /// A missing or outdated system prompt at the head is replaced with
    /// `system_prompt`, then the result is truncated to the cap.
    pub fn restore(stored: Vec<Message>, system_prompt: &str, max_rounds: usize) -> Self {
        let mut messages = stored;
        match messages.first() {
            Some(first) if first.role == Role::System => {
                if first.content != system_prompt {
                    debug!("replacing outdated system prompt in stored history");
                    messages[0] = Message::system(system_prompt);
                }
            }
            _ => messages.insert(0, Message::system(system_prompt)),
        }

        // System messages past the head are never produced by a turn.
        let mut iter = messages.into_iter();
        let head = iter.next();
        let mut messages: Vec<Message> = head.into_iter().collect();
        messages.extend(iter.filter(|m| m.role != Role::System));

        let mut history = Self {
            messages,
            max_rounds,
        };
        history.truncate();
        history
    }

    /// Maximum length after truncation: the system prompt plus
    /// `max_rounds` exchanges.
    pub fn cap(&self) -> usize {
        self.max_rounds * 2 + 1
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing but the system prompt is held.
    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Messages sent as context for the next question: everything after
    /// the system prompt, excluding a trailing unanswered user message.
    pub fn context(&self) -> &[Message] {
        let end = match self.messages.last() {
            Some(last) if last.role == Role::User && self.messages.len() > 1 => {
                self.messages.len() - 1
            }
            _ => self.messages.len(),
        };
        &self.messages[1..end]
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Drop a trailing user message that never got an answer.
    pub fn discard_unanswered(&mut self) -> Option<Message> {
        match self.messages.last() {
            Some(last) if last.role == Role::User && self.messages.len() > 1 => {
                self.messages.pop()
            }
            _ => None,
        }
    }

    /// Keep the system prompt and the newest `2 * max_rounds` messages.
    pub fn truncate(&mut self) {
        let keep = self.max_rounds * 2;
        if self.messages.len() > keep + 1 {
            let excess = self.messages.len() - 1 - keep;
            self.messages.drain(1..1 + excess);
            debug!(dropped = excess, "history truncated");
        }
    }

    /// Back to just the system prompt.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }
}

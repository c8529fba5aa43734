//! `ConversationOrchestrator` runs question turns.
//!
//! A turn with a connected avatar streams the answer into the display and
//! then has the avatar speak it. Without an avatar the answer is fetched in
//! one request and only displayed. Completed turns are persisted.

mod guard;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use docent_ai::{AiClient, ChatError};
use docent_avatar::AvatarSession;
use docent_common::{Event, Message, Role, TurnId};
use docent_config::schema::ConversationConfig;
use docent_platform::{KeyValueStore, PersistenceStore};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::display::{ConnectionStatus, DisplaySink};
use crate::history::ConversationHistory;
use crate::TurnError;

use guard::TurnGuard;

const THINKING_TEXT: &str = "AI思考中...";
const ERROR_PREFIX: &str = "❌ 抱歉，我遇到了一些问题：";

/// Conversation behavior taken from `[conversation]`.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub system_prompt: String,
    pub max_history_rounds: usize,
    /// Pause between the "listen" pose and speech.
    pub settle_delay: Duration,
    /// Pause between connecting and the greeting.
    pub greet_delay: Duration,
    pub greeting: String,
    pub preset_questions: Vec<String>,
}

impl From<&ConversationConfig> for OrchestratorSettings {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            max_history_rounds: config.max_history_rounds,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            greet_delay: Duration::from_millis(config.greet_delay_ms),
            greeting: config.greeting.clone(),
            preset_questions: config
                .preset_questions
                .iter()
                .map(|p| p.question.clone())
                .collect(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&ConversationConfig::default())
    }
}

pub struct ConversationOrchestrator<S: KeyValueStore> {
    chat: Arc<dyn AiClient>,
    avatar: Arc<AvatarSession>,
    store: Mutex<PersistenceStore<S>>,
    display: Mutex<Box<dyn DisplaySink>>,
    history: Mutex<ConversationHistory>,
    processing: AtomicBool,
    settings: OrchestratorSettings,
}

impl<S: KeyValueStore> ConversationOrchestrator<S> {
    /// Build an orchestrator, restoring any history held in `store`.
    pub fn new(
        chat: Arc<dyn AiClient>,
        avatar: Arc<AvatarSession>,
        store: PersistenceStore<S>,
        display: Box<dyn DisplaySink>,
        settings: OrchestratorSettings,
    ) -> Self {
        let history = ConversationHistory::restore(
            store.get_history(),
            &settings.system_prompt,
            settings.max_history_rounds,
        );
        debug!(messages = history.len(), "conversation history restored");

        Self {
            chat,
            avatar,
            store: Mutex::new(store),
            display: Mutex::new(display),
            history: Mutex::new(history),
            processing: AtomicBool::new(false),
            settings,
        }
    }

    /// Answer one question. Rejected with `Busy` while another turn runs.
    pub async fn submit(&self, input: &str) -> Result<String, TurnError> {
        let _guard = TurnGuard::acquire(&self.processing).inspect_err(|_| {
            warn!("question rejected: a turn is already in flight");
        })?;

        let question = input.trim();
        if question.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        let turn = TurnId::new();
        self.run_turn(question)
            .instrument(info_span!("turn", id = %turn))
            .await
    }

    async fn run_turn(&self, question: &str) -> Result<String, TurnError> {
        info!("question received");

        let context = {
            let mut history = self.lock_history();
            let context = history.context().to_vec();
            history.push_user(question);
            context
        };
        {
            let mut display = self.display();
            display.append_message(Role::User, question);
            display.clear_input();
        }

        let connected = self.avatar.is_connected();
        if connected {
            self.avatar.think();
        }
        self.display().show_loading(THINKING_TEXT);

        let result = if connected {
            self.answer_streaming(question, &context).await
        } else {
            self.answer_blocking(question, &context).await
        };

        self.display().hide_loading();

        match result {
            Ok(response) => {
                self.record_answer(&response);
                info!(chars = response.chars().count(), "turn complete");
                Ok(response)
            }
            Err(e) => {
                warn!("turn failed: {e}");
                self.lock_history().discard_unanswered();
                self.display()
                    .append_message(Role::System, &format!("{ERROR_PREFIX}{e}"));
                Err(e.into())
            }
        }
    }

    async fn answer_streaming(
        &self,
        question: &str,
        context: &[Message],
    ) -> Result<String, ChatError> {
        self.display().append_message(Role::Assistant, "");

        let mut on_chunk = |_delta: &str, full: &str| {
            self.display().update_assistant_message(full);
        };
        let response = self
            .chat
            .ask_question(
                question,
                &self.settings.system_prompt,
                context,
                Some(&mut on_chunk),
            )
            .await?;

        self.display().hide_loading();

        if self.avatar.is_connected() {
            self.avatar.listen();
            tokio::time::sleep(self.settings.settle_delay).await;
            if self.avatar.is_connected() {
                self.avatar.speak(&response, true);
            }
        }

        Ok(response)
    }

    async fn answer_blocking(
        &self,
        question: &str,
        context: &[Message],
    ) -> Result<String, ChatError> {
        let response = self
            .chat
            .ask_question(question, &self.settings.system_prompt, context, None)
            .await?;
        self.display().append_message(Role::Assistant, &response);
        Ok(response)
    }

    fn record_answer(&self, response: &str) {
        let snapshot = {
            let mut history = self.lock_history();
            history.push_assistant(response);
            history.truncate();
            history.messages().to_vec()
        };
        if !self.store().save_history(&snapshot) {
            warn!("conversation history not persisted");
        }
    }

    /// Ask the configured preset question at `index` (zero-based).
    pub async fn ask_preset(&self, index: usize) -> Result<String, TurnError> {
        let question = self
            .settings
            .preset_questions
            .get(index)
            .ok_or(TurnError::UnknownPreset(index))?
            .clone();
        self.submit(&question).await
    }

    /// Welcome the visitor once the avatar is up. The greeting is shown and
    /// spoken but not added to the history.
    pub async fn greet(&self) {
        if self.settings.greeting.is_empty() || !self.avatar.is_connected() {
            return;
        }

        self.avatar.listen();
        tokio::time::sleep(self.settings.greet_delay).await;

        self.display()
            .append_message(Role::Assistant, &self.settings.greeting);
        if self.avatar.is_connected() {
            self.avatar.speak(&self.settings.greeting, true);
        }
    }

    /// Reflect an avatar event on the display.
    pub fn apply_avatar_event(&self, event: &Event) {
        match event {
            Event::AvatarConnected => {
                let mut display = self.display();
                display.hide_loading();
                display.set_connection_status(ConnectionStatus::Online);
                drop(display);
                self.avatar.apply_volume();
            }
            Event::AvatarDisconnected => {
                self.display()
                    .set_connection_status(ConnectionStatus::Offline);
            }
            Event::AvatarSpeaking(true) => {
                self.display()
                    .set_connection_status(ConnectionStatus::Speaking);
            }
            Event::AvatarSpeaking(false) => {
                if self.avatar.is_connected() {
                    self.display()
                        .set_connection_status(ConnectionStatus::Online);
                }
            }
            Event::LoadProgress(100) => self.display().hide_loading(),
            Event::AvatarError(message) => {
                self.display()
                    .append_message(Role::System, &format!("❌ 数字人发生错误: {message}"));
            }
            _ => {}
        }
    }

    /// Forget the conversation, in memory and in storage.
    pub fn clear_history(&self) {
        self.lock_history().reset();
        if !self.store().clear_history() {
            warn!("stored conversation history not cleared");
        }
        info!("conversation history cleared");
    }

    /// Snapshot of the current history, system prompt first.
    pub fn history(&self) -> Vec<Message> {
        self.lock_history().messages().to_vec()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn avatar(&self) -> &Arc<AvatarSession> {
        &self.avatar
    }

    fn lock_history(&self) -> MutexGuard<'_, ConversationHistory> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn display(&self) -> MutexGuard<'_, Box<dyn DisplaySink>> {
        self.display.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self) -> MutexGuard<'_, PersistenceStore<S>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

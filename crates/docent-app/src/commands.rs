//! One-shot subcommands: key management, history, single questions.

use std::sync::Arc;

use colored::Colorize;
use docent_ai::AiClient;
use docent_common::{Credential, DocentError, EventBus, Role};
use docent_config::schema::DocentConfig;
use docent_conversation::{ConversationOrchestrator, OrchestratorSettings};
use docent_platform::{KeyValueStore, PersistenceStore};

use crate::cli::{HistoryAction, KeyAction};
use crate::display::TerminalDisplay;
use crate::setup;

pub async fn key<S: KeyValueStore>(
    action: KeyAction,
    config: &DocentConfig,
    store: &mut PersistenceStore<S>,
) -> Result<(), DocentError> {
    match action {
        KeyAction::Test => {
            if config.chat.test_api_key.is_empty() {
                return Err(DocentError::Other(
                    "no built-in test key is configured ([chat] test_api_key)".into(),
                ));
            }
            save(store, &Credential::test(config.chat.test_api_key.clone()))?;
            println!("{}", "✅ 已使用内置测试密钥".green());
        }
        KeyAction::Set { key } => {
            let credential = Credential::custom(&key)?;
            save(store, &credential)?;
            println!("{}", "✅ 自定义密钥已保存".green());
        }
        KeyAction::Clear => {
            if !store.clear_credential() {
                return Err(DocentError::Other("failed to clear the stored key".into()));
            }
            println!("{}", "✅ 密钥已清除".green());
        }
        KeyAction::Show => match store.get_credential() {
            Some(credential) => println!(
                "{} ({})",
                mask(&credential.key),
                credential.kind.display_text().bright_black()
            ),
            None => println!("{}", store.get_credential_kind().display_text().bright_black()),
        },
        KeyAction::Verify => {
            let credential = require_credential(store)?;
            let client = setup::chat_client(&config.chat, &credential)
                .map_err(|e| DocentError::Chat(e.to_string()))?;
            if client.test_api_key().await {
                println!("{}", "✅ 密钥可用".green());
            } else {
                return Err(DocentError::Chat("the API rejected the stored key".into()));
            }
        }
    }
    Ok(())
}

pub fn history<S: KeyValueStore>(
    action: HistoryAction,
    store: &mut PersistenceStore<S>,
) -> Result<(), DocentError> {
    match action {
        HistoryAction::Show => {
            let messages = store.get_history();
            if messages.is_empty() {
                println!("{}", "(no conversation stored)".bright_black());
            }
            for message in messages {
                let role = match message.role {
                    Role::System => "system".yellow(),
                    Role::User => "user".bright_blue(),
                    Role::Assistant => "assistant".bright_green(),
                };
                println!("{role}: {}", message.content);
            }
        }
        HistoryAction::Clear => {
            if !store.clear_history() {
                return Err(DocentError::Other("failed to clear the stored history".into()));
            }
            println!("{}", "✅ 对话历史已清除".green());
        }
    }
    Ok(())
}

/// Answer one question without the avatar. The exchange joins the stored
/// history like any kiosk turn.
pub async fn ask<S: KeyValueStore>(
    question: &str,
    config: &DocentConfig,
    store: PersistenceStore<S>,
) -> Result<(), DocentError> {
    let credential = require_credential(&store)?;
    let client = setup::chat_client(&config.chat, &credential)
        .map_err(|e| DocentError::Chat(e.to_string()))?;
    let avatar = setup::avatar_session(&config.avatar, false, Arc::new(EventBus::default()));

    let orch = ConversationOrchestrator::new(
        Arc::new(client),
        Arc::new(avatar),
        store,
        Box::new(TerminalDisplay::stdout()),
        OrchestratorSettings::from(&config.conversation),
    );
    orch.submit(question)
        .await
        .map(|_| ())
        .map_err(|e| DocentError::Chat(e.to_string()))
}

pub fn require_credential<S: KeyValueStore>(
    store: &PersistenceStore<S>,
) -> Result<Credential, DocentError> {
    store.get_credential().ok_or_else(|| {
        DocentError::Other(
            "no API key set; run `docent key test` or `docent key set <key>` first".into(),
        )
    })
}

fn save<S: KeyValueStore>(store: &mut PersistenceStore<S>, credential: &Credential) -> Result<(), DocentError> {
    if store.save_credential(credential) {
        Ok(())
    } else {
        Err(DocentError::Other("failed to save the key".into()))
    }
}

/// `abcd****wxyz`; short keys are fully hidden.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

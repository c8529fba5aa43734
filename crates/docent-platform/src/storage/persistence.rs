//! Credential and conversation-history persistence.

use docent_common::{Credential, CredentialKind, Message, StorageError};
use tracing::{debug, error, warn};

use super::kv::KeyValueStore;

pub const API_KEY_KEY: &str = "glm_api_key";
pub const API_KEY_KIND_KEY: &str = "glm_api_key_type";
pub const CHAT_HISTORY_KEY: &str = "chat_history";

/// Typed access to the three persisted entries.
///
/// Storage failures never propagate: they are logged and reported as
/// `false`, `None`, or an empty history.
pub struct PersistenceStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn save_credential(&mut self, credential: &Credential) -> bool {
        let previous = self.backend.get(API_KEY_KEY).ok().flatten();

        if let Err(e) = self.backend.set(API_KEY_KEY, &credential.key) {
            error!("failed to save api key: {e}");
            return false;
        }
        if let Err(e) = self
            .backend
            .set(API_KEY_KIND_KEY, credential.kind.as_str())
        {
            error!("failed to save api key kind: {e}");
            self.restore_key(previous);
            return false;
        }

        debug!(kind = %credential.kind, "credential saved");
        true
    }

    /// Put back the key that was stored before a half-finished save. If
    /// that fails too the key is removed, so the new key is never paired
    /// with the old kind.
    fn restore_key(&mut self, previous: Option<String>) {
        let result = match previous {
            Some(key) => self.backend.set(API_KEY_KEY, &key),
            None => self.backend.remove(API_KEY_KEY),
        };
        let Err(e) = result else {
            return;
        };
        warn!("failed to restore previous api key: {e}");
        if let Err(e) = self.backend.remove(API_KEY_KEY) {
            error!("failed to remove half-saved api key: {e}");
        }
    }

    pub fn get_credential(&self) -> Option<Credential> {
        match self.backend.get(API_KEY_KEY) {
            Ok(Some(key)) => Some(Credential {
                key,
                kind: self.get_credential_kind(),
            }),
            Ok(None) => None,
            Err(e) => {
                error!("failed to read api key: {e}");
                None
            }
        }
    }

    pub fn get_credential_kind(&self) -> CredentialKind {
        match self.backend.get(API_KEY_KIND_KEY) {
            Ok(Some(tag)) => CredentialKind::from_tag(&tag),
            Ok(None) => CredentialKind::None,
            Err(e) => {
                error!("failed to read api key kind: {e}");
                CredentialKind::None
            }
        }
    }

    pub fn clear_credential(&mut self) -> bool {
        let result = self
            .backend
            .remove(API_KEY_KEY)
            .and_then(|_| self.backend.remove(API_KEY_KIND_KEY));
        log_failure("clear api key", result)
    }

    pub fn save_history(&mut self, messages: &[Message]) -> bool {
        let result = serde_json::to_string(messages)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(CHAT_HISTORY_KEY, &json));
        log_failure("save chat history", result)
    }

    pub fn get_history(&self) -> Vec<Message> {
        let raw = match self.backend.get(CHAT_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("failed to read chat history: {e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("stored chat history is unreadable, ignoring it: {e}");
            Vec::new()
        })
    }

    pub fn clear_history(&mut self) -> bool {
        let result = self.backend.remove(CHAT_HISTORY_KEY);
        log_failure("clear chat history", result)
    }

    pub fn clear_all(&mut self) -> bool {
        let credential = self.clear_credential();
        let history = self.clear_history();
        credential && history
    }
}

fn log_failure(action: &str, result: Result<(), StorageError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("failed to {action}: {e}");
            false
        }
    }
}

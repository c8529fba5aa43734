use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CredentialError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of a conversation, in the `{role, content}` wire shape used by
/// both the chat-completion API and the persisted history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// The built-in key shipped in the config.
    Test,
    Custom,
    #[default]
    None,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Custom => "custom",
            Self::None => "none",
        }
    }

    /// Unknown tags read back from storage map to `None`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "test" => Self::Test,
            "custom" => Self::Custom,
            _ => Self::None,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            Self::Test => "built-in test key",
            Self::Custom => "custom key",
            Self::None => "not set",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    pub kind: CredentialKind,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}

impl Credential {
    pub fn test(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: CredentialKind::Test,
        }
    }

    /// Build a user-supplied key. Keys look like `<id>.<secret>`.
    pub fn custom(key: &str) -> Result<Self, CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        if !key.contains('.') {
            return Err(CredentialError::InvalidFormat);
        }
        Ok(Self {
            key: key.to_string(),
            kind: CredentialKind::Custom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_lowercase_role() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn message_deserializes_from_wire_shape() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hello"}"#).unwrap();
        assert_eq!(msg, Message::assistant("hello"));
    }

    #[test]
    fn credential_kind_tags() {
        assert_eq!(CredentialKind::from_tag("test"), CredentialKind::Test);
        assert_eq!(CredentialKind::from_tag("custom"), CredentialKind::Custom);
        assert_eq!(CredentialKind::from_tag("bogus"), CredentialKind::None);
        assert_eq!(CredentialKind::Custom.to_string(), "custom");
        assert_eq!(CredentialKind::None.display_text(), "not set");
    }

    #[test]
    fn custom_credential_is_trimmed() {
        let cred = Credential::custom("  abc.def \n").unwrap();
        assert_eq!(cred.key, "abc.def");
        assert_eq!(cred.kind, CredentialKind::Custom);
    }

    #[test]
    fn custom_credential_rejects_empty_and_malformed() {
        assert_eq!(Credential::custom("   "), Err(CredentialError::Empty));
        assert_eq!(
            Credential::custom("nodotkey"),
            Err(CredentialError::InvalidFormat)
        );
    }

    #[test]
    fn credential_debug_redacts_key() {
        let cred = Credential::test("secret.value");
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("secret.value"));
        assert!(dbg.contains("REDACTED"));
    }
}

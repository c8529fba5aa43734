//! Chat-completion endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where and how to reach the chat-completion API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_url: String,
    pub model: String,
    /// Key installed by `docent key test`. Empty means no test key ships.
    pub test_api_key: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("test_api_key", &"[REDACTED]")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://open.bigmodel.cn/api/paas/v4/chat/completions".into(),
            model: "glm-4".into(),
            test_api_key: String::new(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

//! GLM client struct, request building, and response parsing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ChatError, Message};

use super::config::GlmConfig;

const FALLBACK_ERROR: &str = "request failed";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// GLM chat-completion client.
pub struct GlmClient {
    pub(crate) config: GlmConfig,
    pub(crate) http: reqwest::Client,
}

impl GlmClient {
    pub fn new(config: GlmConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GlmConfig {
        &self.config
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.api_key = Some(api_key.into());
    }

    pub fn clear_api_key(&mut self) {
        self.config.api_key = None;
    }

    pub fn has_api_key(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }

    /// POST the conversation and return the response once its status is a
    /// success. Non-success statuses become `ChatError::Api`.
    pub(crate) async fn post(
        &self,
        messages: &[Message],
        stream: bool,
    ) -> Result<reqwest::Response, ChatError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ChatError::Auth),
        };

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            stream,
        };

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            stream,
            "GLM API request"
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            warn!(%status, "GLM API rejected request: {message}");
            return Err(ChatError::Api(message));
        }

        Ok(response)
    }
}

/// Pull `error.message` out of an error body, or fall back to a generic text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR.to_string())
}

/// Parse a non-streaming completion body into its first answer.
pub(crate) fn parse_completion(body: &str) -> Result<String, ChatError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Parse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ChatError::Parse("response has no choices[0].message.content".into()))
}

//! AiClient trait implementation for GlmClient (send_message + streaming).

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::{accumulate_stream, response_reader};
use crate::{AiClient, ChatError, ChunkCallback, Message};

use super::client::{parse_completion, GlmClient};

#[async_trait]
impl AiClient for GlmClient {
    async fn send_message(&self, messages: &[Message]) -> Result<String, ChatError> {
        let response = self.post(messages, false).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let content = parse_completion(&body)?;
        debug!(chars = content.chars().count(), "GLM API response");
        Ok(content)
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut ChunkCallback<'_>,
    ) -> Result<String, ChatError> {
        let response = self.post(messages, true).await?;

        let content = accumulate_stream(response_reader(response), on_chunk).await?;
        debug!(chars = content.chars().count(), "GLM API stream finished");
        Ok(content)
    }
}

//! OpenAI chat completions client.

use async_trait::async_trait;
use ragkit_core::{ChatModel, ChatRequest, Message, RagError, Result};
use tracing::{debug, error};

use super::config::OpenAIConfig;
use super::convert::{self, CompletionResponse, ErrorResponse};

/// Chat model for the OpenAI API and OpenAI-compatible servers.
///
/// Requests are sent non-streaming to `{base_url}/chat/completions`. Tools
/// bound on the [`ChatRequest`] are forwarded as function declarations, and
/// tool calls in the reply come back as [`ToolCall`](ragkit_core::ToolCall)s
/// with parsed JSON arguments.
pub struct OpenAIChatModel {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIChatModel {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the API key or model name is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::Config("OpenAI API key must not be empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(RagError::Config("OpenAI model name must not be empty".to_string()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIConfig::compatible(api_key, base_url, model))
    }

    /// Create a client from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    /// The active configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: ChatRequest) -> Result<Message> {
        let model = self.config.model.as_str();
        let body = convert::build_request(
            model,
            &request.messages,
            &request.tools,
            request.config.as_ref(),
            self.config.temperature,
        );

        debug!(
            model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            temperature = ?body.temperature,
            "sending chat completion"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model, error = %e, "chat completion request failed");
                RagError::generation(model, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&text).map(|e| e.error.message).unwrap_or(text);
            error!(model, %status, "chat completion API error");
            return Err(RagError::generation(model, format!("API returned {status}: {detail}")));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            error!(model, error = %e, "failed to parse chat completion");
            RagError::generation(model, format!("failed to parse response: {e}"))
        })?;

        let message = convert::from_response(model, parsed)?;
        debug!(model, tool_calls = message.tool_calls.len(), "chat completion received");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_credentials() {
        assert!(matches!(
            OpenAIChatModel::new(OpenAIConfig::new("", "gpt-4o-mini")),
            Err(RagError::Config(_))
        ));
        assert!(OpenAIChatModel::new(OpenAIConfig::new("key", " ")).is_err());
    }

    #[test]
    fn name_is_model() {
        let model = OpenAIChatModel::compatible("key", "http://localhost:8000/v1", "qwen").unwrap();
        assert_eq!(model.name(), "qwen");
    }
}

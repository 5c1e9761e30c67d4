//! The chat model collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::ToolSpec;

/// Sampling parameters forwarded to the model backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature in `[0, 2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// A single generation request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation so far.
    pub messages: Vec<Message>,
    /// Tools the model may ask to invoke. Empty means no tool binding.
    pub tools: Vec<ToolSpec>,
    /// Optional sampling overrides.
    pub config: Option<GenerationConfig>,
}

impl ChatRequest {
    /// Create a request for the given conversation with no tools bound.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, tools: Vec::new(), config: None }
    }

    /// Bind tools to the request.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Set sampling parameters.
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A language model that turns a conversation into the next message.
///
/// When the request binds tools, the returned Assistant message may carry
/// [`ToolCall`](crate::ToolCall)s instead of a final answer; callers that bind
/// tools must execute them and resubmit the results as [`Role::Tool`](crate::Role::Tool)
/// messages before expecting a text reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier, used in logs and errors.
    fn name(&self) -> &str;

    /// Generate the next message.
    async fn generate(&self, request: ChatRequest) -> Result<Message>;
}

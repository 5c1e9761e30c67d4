//! A chat model bound to a set of tools.

use std::sync::Arc;

use ragkit_core::{ChatModel, ChatRequest, GenerationConfig, Message, RagError, Result};
use tracing::{debug, info, instrument, warn};

use crate::node::ToolsNode;

/// Default limit on model turns in [`ToolAgent::run`].
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Runs the generate, execute, resubmit loop of a tool-calling model.
///
/// # Example
///
/// ```rust,ignore
/// let agent = ToolAgent::new(model, ToolsNode::new(vec![Arc::new(search)])?)
///     .with_temperature(0.7);
///
/// // Model picks a tool, the tool runs, the Tool messages come back.
/// let results = agent.call_tools(messages.clone()).await?;
///
/// // Or keep going until the model answers in plain text.
/// let answer = agent.run(messages).await?;
/// ```
pub struct ToolAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolsNode,
    config: Option<GenerationConfig>,
    max_rounds: usize,
}

impl ToolAgent {
    /// Bind `tools` to `model`.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolsNode) -> Self {
        Self { model, tools, config: None, max_rounds: DEFAULT_MAX_ROUNDS }
    }

    /// Set the sampling temperature sent with every request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.get_or_insert_with(GenerationConfig::default).temperature = Some(temperature);
        self
    }

    /// Limit the number of model turns in [`run`](Self::run). Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// The bound tools.
    pub fn tools(&self) -> &ToolsNode {
        &self.tools
    }

    /// Generate once and execute the tools the model asked for.
    ///
    /// Returns the Tool messages, or the model's reply alone when it called no
    /// tool.
    #[instrument(skip_all, fields(model = %self.model.name()))]
    pub async fn call_tools(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let reply = self.generate(messages).await?;
        if !reply.has_tool_calls() {
            debug!("model answered without calling a tool");
            return Ok(vec![reply]);
        }
        self.tools.invoke(&reply).await
    }

    /// Loop until the model answers without tool calls.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if the model is still calling tools after
    /// `max_rounds` turns, or whatever the model or a tool failed with.
    #[instrument(skip_all, fields(model = %self.model.name(), max_rounds = self.max_rounds))]
    pub async fn run(&self, mut messages: Vec<Message>) -> Result<Message> {
        for round in 1..=self.max_rounds {
            let reply = self.generate(messages.clone()).await?;
            if !reply.has_tool_calls() {
                info!(round, "tool agent finished");
                return Ok(reply);
            }

            debug!(round, calls = reply.tool_calls.len(), "executing requested tools");
            let results = self.tools.invoke(&reply).await?;
            messages.push(reply);
            messages.extend(results);
        }

        warn!(max_rounds = self.max_rounds, "tool agent did not converge");
        Err(RagError::Pipeline(format!(
            "model still calling tools after {} rounds",
            self.max_rounds
        )))
    }

    async fn generate(&self, messages: Vec<Message>) -> Result<Message> {
        let mut request = ChatRequest::new(messages).with_tools(self.tools.specs());
        request.config = self.config.clone();
        self.model.generate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunctionTool;
    use ragkit_core::{Role, ToolCall};
    use serde_json::{Value, json};

    struct Scripted {
        replies: std::sync::Mutex<Vec<Message>>,
        seen: std::sync::Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Message>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self { replies: replies.into(), seen: Default::default() })
        }
    }

    #[async_trait::async_trait]
    impl ChatModel for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: ChatRequest) -> Result<Message> {
            self.seen.lock().unwrap().push(request);
            self.replies.lock().unwrap().pop().ok_or_else(|| RagError::generation("scripted", "empty"))
        }
    }

    fn calling(tool: &str, arguments: Value) -> Message {
        Message::assistant("").with_tool_calls(vec![ToolCall {
            id: "call_1".into(),
            name: tool.into(),
            arguments,
        }])
    }

    fn tools() -> ToolsNode {
        let upper = FunctionTool::new("upper", "Uppercase text", |args: Value| async move {
            Ok(json!(args["text"].as_str().unwrap_or_default().to_uppercase()))
        });
        ToolsNode::new(vec![Arc::new(upper)]).unwrap()
    }

    #[tokio::test]
    async fn run_resubmits_tool_results() {
        let model = Scripted::new(vec![calling("upper", json!({"text": "hi"})), Message::assistant("HI it is")]);
        let agent = ToolAgent::new(model.clone(), tools()).with_temperature(0.7);

        let answer = agent.run(vec![Message::user("shout hi")]).await.unwrap();
        assert_eq!(answer.content, "HI it is");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].tools[0].name, "upper");
        assert_eq!(seen[0].config.as_ref().and_then(|c| c.temperature), Some(0.7));
        let second = &seen[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[2].role, Role::Tool);
        assert_eq!(second[2].content, "HI");
    }

    #[tokio::test]
    async fn call_tools_returns_tool_messages() {
        let model = Scripted::new(vec![calling("upper", json!({"text": "abc"}))]);
        let results = ToolAgent::new(model, tools()).call_tools(vec![Message::user("x")]).await.unwrap();

        assert_eq!(results, vec![Message::tool("call_1", "ABC")]);
    }

    #[tokio::test]
    async fn run_stops_after_max_rounds() {
        let model = Scripted::new(vec![
            calling("upper", json!({"text": "a"})),
            calling("upper", json!({"text": "b"})),
        ]);
        let err = ToolAgent::new(model, tools())
            .with_max_rounds(2)
            .run(vec![Message::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Pipeline(_)));
    }
}

//! Scripted chat model for tests and offline demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use ragkit_core::{ChatModel, ChatRequest, Message, RagError, Result, Role, ToolCall};
use serde_json::Value;

/// What the mock answers once its script is exhausted.
#[derive(Debug, Clone)]
enum Fallback {
    /// Reply with the content of the last User message.
    Echo,
    /// Fail with a generation error.
    Fail,
}

/// A [`ChatModel`] that replays queued messages.
///
/// Every call is counted and its request recorded, which lets tests assert
/// that a cancelled pipeline never reached generation. An optional delay makes
/// each call sleep first so timeouts and cancellation can be exercised.
///
/// # Example
///
/// ```rust
/// use ragkit_model::MockChatModel;
///
/// let model = MockChatModel::new("mock")
///     .with_text_reply("The support phone is 555-0100.");
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockChatModel {
    name: String,
    replies: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<ChatRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    fallback: Fallback,
}

impl MockChatModel {
    /// Create a mock that fails once its script runs out.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
            fallback: Fallback::Fail,
        }
    }

    /// Create a mock that echoes the last user message back as the answer.
    pub fn echo(name: impl Into<String>) -> Self {
        Self { fallback: Fallback::Echo, ..Self::new(name) }
    }

    /// Queue a reply.
    pub fn with_reply(self, reply: Message) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a plain assistant text reply.
    pub fn with_text_reply(self, text: impl Into<String>) -> Self {
        self.with_reply(Message::assistant(text))
    }

    /// Queue an assistant reply that asks for a single tool call.
    pub fn with_tool_call_reply(self, tool: impl Into<String>, arguments: Value) -> Self {
        let call_id = format!("call_{}", self.replies_queued());
        self.with_reply(
            Message::assistant("")
                .with_tool_calls(vec![ToolCall { id: call_id, name: tool.into(), arguments }]),
        )
    }

    /// Sleep for `delay` at the start of every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times [`generate`](ChatModel::generate) was entered.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        lock(&self.requests).last().cloned()
    }

    fn replies_queued(&self) -> usize {
        lock(&self.replies).len()
    }

    fn next_reply(&self, request: &ChatRequest) -> Result<Message> {
        if let Some(reply) = lock(&self.replies).pop_front() {
            return Ok(reply);
        }
        match self.fallback {
            Fallback::Echo => {
                let last_user = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(Message::assistant(last_user))
            }
            Fallback::Fail => Err(RagError::generation(&self.name, "no scripted reply left")),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: ChatRequest) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.requests).push(request.clone());
        self.next_reply(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_script_in_order_then_fails() {
        let model = MockChatModel::new("mock").with_text_reply("one").with_text_reply("two");
        let request = ChatRequest::new(vec![Message::user("hi")]);

        assert_eq!(model.generate(request.clone()).await.unwrap().content, "one");
        assert_eq!(model.generate(request.clone()).await.unwrap().content, "two");
        assert!(matches!(model.generate(request).await, Err(RagError::Generation { .. })));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn echo_returns_last_user_message() {
        let model = MockChatModel::echo("echo");
        let reply = model
            .generate(ChatRequest::new(vec![Message::system("s"), Message::user("ping")]))
            .await
            .unwrap();

        assert_eq!(reply, Message::assistant("ping"));
        assert_eq!(model.last_request().unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn tool_call_replies_get_distinct_ids() {
        let model = MockChatModel::new("mock")
            .with_tool_call_reply("search", json!({"q": 1}))
            .with_tool_call_reply("search", json!({"q": 2}));
        let request = ChatRequest::new(vec![Message::user("x")]);

        let a = model.generate(request.clone()).await.unwrap();
        let b = model.generate(request).await.unwrap();
        assert!(a.has_tool_calls());
        assert_ne!(a.tool_calls[0].id, b.tool_calls[0].id);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_before_replying() {
        let model = MockChatModel::echo("slow").with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        model.generate(ChatRequest::new(vec![Message::user("x")])).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}

//! Executing the tool calls of an assistant message.

use std::collections::HashMap;
use std::sync::Arc;

use ragkit_core::{Message, RagError, Result, Tool, ToolCall, ToolSpec};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// A registry of tools that turns tool calls into Tool messages.
///
/// Calls from one message run concurrently. Results are returned in the order
/// the calls appear in the message, one [`Role::Tool`](ragkit_core::Role::Tool)
/// message per call, tagged with the call id.
#[derive(Clone, Default)]
pub struct ToolsNode {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolsNode {
    /// Create a node from a set of tools.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if two tools share a name.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(tools.len());
        for (index, tool) in tools.iter().enumerate() {
            if by_name.insert(tool.name().to_string(), index).is_some() {
                return Err(RagError::Config(format!("duplicate tool name '{}'", tool.name())));
            }
        }
        Ok(Self { tools, by_name })
    }

    /// Declarations of every registered tool, for binding to a model request.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    /// Execute every tool call carried by `message`.
    ///
    /// A message without tool calls yields no Tool messages.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Tool`] if a call names an unknown tool or any tool
    /// fails. No partial results are returned.
    pub async fn invoke(&self, message: &Message) -> Result<Vec<Message>> {
        if !message.has_tool_calls() {
            debug!("message carries no tool calls");
            return Ok(Vec::new());
        }

        let mut set = JoinSet::new();
        for (index, call) in message.tool_calls.iter().enumerate() {
            let tool = self
                .get(&call.name)
                .cloned()
                .ok_or_else(|| RagError::tool(&call.name, "tool not found"))?;
            let call = call.clone();
            set.spawn(async move {
                let output = run_call(tool.as_ref(), &call).await;
                (index, call, output)
            });
        }

        let mut results: Vec<Option<Message>> = vec![None; message.tool_calls.len()];
        while let Some(joined) = set.join_next().await {
            let (index, call, output) =
                joined.map_err(|e| RagError::Pipeline(format!("tool task failed: {e}")))?;
            results[index] = Some(Message::tool(call.id, render_output(output?)));
        }

        Ok(results.into_iter().flatten().collect())
    }
}

async fn run_call(tool: &dyn Tool, call: &ToolCall) -> Result<Value> {
    info!(tool = %call.name, call_id = %call.id, "executing tool");
    tool.execute(call.arguments.clone()).await.inspect_err(|e| {
        error!(tool = %call.name, call_id = %call.id, error = %e, "tool failed");
    })
}

fn render_output(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl std::fmt::Debug for ToolsNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("ToolsNode").field("tools", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::FunctionTool;
    use ragkit_core::Role;
    use serde_json::json;

    fn node() -> ToolsNode {
        let slow = FunctionTool::new("slow", "Sleeps then answers", |_| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(json!("slow done"))
        });
        let fast = FunctionTool::new("fast", "Answers immediately", |args| async move {
            Ok(json!({ "echo": args }))
        });
        ToolsNode::new(vec![Arc::new(slow), Arc::new(fast)]).unwrap()
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
        ToolCall { id: id.into(), name: name.into(), arguments }
    }

    #[tokio::test]
    async fn results_follow_call_order() {
        let message = Message::assistant("").with_tool_calls(vec![
            call("c1", "slow", json!({})),
            call("c2", "fast", json!({"x": 1})),
        ]);

        let results = node().invoke(&message).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|m| m.role == Role::Tool));
        assert_eq!(results[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(results[0].content, "slow done");
        assert_eq!(results[1].content, r#"{"echo":{"x":1}}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let message =
            Message::assistant("").with_tool_calls(vec![call("c1", "missing", json!({}))]);
        let err = node().invoke(&message).await.unwrap_err();
        assert!(matches!(err, RagError::Tool { name, .. } if name == "missing"));
    }

    #[tokio::test]
    async fn no_tool_calls_yields_nothing() {
        assert!(node().invoke(&Message::assistant("hi")).await.unwrap().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let a = FunctionTool::new("t", "a", |v| async move { Ok(v) });
        let b = FunctionTool::new("t", "b", |v| async move { Ok(v) });
        assert!(ToolsNode::new(vec![Arc::new(a), Arc::new(b)]).is_err());
    }
}

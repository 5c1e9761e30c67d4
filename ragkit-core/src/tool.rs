//! Tool declarations and the executable tool contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A statically declared tool: name, description, and JSON-schema parameters.
///
/// This is what gets bound to a [`ChatModel`](crate::ChatModel) request. The
/// schema is authored by hand rather than derived from a handler signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name the model refers to.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON schema (object) describing the arguments.
    pub parameters: Value,
}

/// An executable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool name. Must match the name in [`ToolCall`](crate::ToolCall)s.
    fn name(&self) -> &str;

    /// Human-readable description for the model.
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments.
    fn parameters_schema(&self) -> Value;

    /// The declaration bound to model requests.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Run the tool with the model-supplied arguments.
    async fn execute(&self, args: Value) -> Result<Value>;
}

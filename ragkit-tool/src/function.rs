//! Tools backed by async closures.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use ragkit_core::{RagError, Result, Tool};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

type BoxedFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;
type Handler = Arc<dyn Fn(Value) -> BoxedFuture + Send + Sync>;

/// A [`Tool`] whose behaviour is an async function.
///
/// The parameter schema is declared explicitly with
/// [`with_parameters`](Self::with_parameters); it defaults to an object schema
/// with no properties.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_tool::FunctionTool;
/// use serde_json::json;
///
/// #[derive(serde::Deserialize)]
/// struct SearchParams { sql: String }
///
/// let tool = FunctionTool::typed("search_product", "Search products", |p: SearchParams| async move {
///     Ok(json!({ "sql": p.sql }))
/// })
/// .with_parameters(json!({
///     "type": "object",
///     "properties": { "sql": { "type": "string", "description": "SQL for searching products." } },
///     "required": ["sql"]
/// }));
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
    handler: Handler,
}

impl FunctionTool {
    /// Create a tool from a handler receiving the raw JSON arguments.
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: json!({ "type": "object", "properties": {} }),
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }

    /// Create a tool whose arguments and result go through serde.
    ///
    /// Arguments that fail to deserialize into `A` are reported as
    /// [`RagError::Tool`] without calling the handler.
    pub fn typed<A, R, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let name = name.into();
        let tool_name = name.clone();
        let handler = Arc::new(handler);

        Self::new(name, description, move |args: Value| {
            let tool_name = tool_name.clone();
            let handler = handler.clone();
            async move {
                let params: A = serde_json::from_value(args).map_err(|e| {
                    RagError::tool(&tool_name, format!("invalid arguments: {e}"))
                })?;
                let output = handler(params).await?;
                serde_json::to_value(output)
                    .map_err(|e| RagError::tool(&tool_name, format!("failed to serialize result: {e}")))
            }
        })
    }

    /// Declare the JSON schema of the accepted arguments.
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = schema;
        self
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        (self.handler)(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Add {
        a: i64,
        b: i64,
    }

    #[tokio::test]
    async fn typed_tool_round_trips_through_serde() {
        let tool = FunctionTool::typed("add", "Add numbers", |p: Add| async move { Ok(p.a + p.b) });
        assert_eq!(tool.execute(json!({"a": 2, "b": 3})).await.unwrap(), json!(5));
    }

    #[tokio::test]
    async fn typed_tool_rejects_bad_arguments() {
        let tool = FunctionTool::typed("add", "Add numbers", |p: Add| async move { Ok(p.a + p.b) });
        let err = tool.execute(json!({"a": "two"})).await.unwrap_err();
        assert!(matches!(err, RagError::Tool { name, .. } if name == "add"));
    }

    #[test]
    fn spec_uses_declared_schema() {
        let schema = json!({"type": "object", "properties": {"sql": {"type": "string"}}});
        let tool = FunctionTool::new("search", "Search", |v| async move { Ok(v) })
            .with_parameters(schema.clone());

        let spec = tool.spec();
        assert_eq!(spec.name, "search");
        assert_eq!(spec.parameters, schema);
    }
}

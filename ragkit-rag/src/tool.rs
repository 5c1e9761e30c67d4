//! Agentic retrieval tool.
//!
//! The [`RetrieverTool`] wraps a [`Retriever`] as a [`ragkit_core::Tool`] so a
//! tool-calling model can decide when to search the knowledge base.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit_rag::{Retriever, RetrieverTool};
//!
//! let tool = RetrieverTool::new(Arc::new(retriever));
//!
//! // The model calls the tool with:
//! // { "query": "How do I contact support?", "top_k": 5 }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use ragkit_core::{RagError, Tool};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::Result;
use crate::retriever::{RetrieveOptions, Retriever};

/// A retrieval tool backed by a [`Retriever`].
///
/// Accepts a required `query` string and an optional `top_k`, and returns
/// the scored documents as JSON.
pub struct RetrieverTool {
    retriever: Arc<Retriever>,
}

impl RetrieverTool {
    /// Create a new tool backed by the given retriever.
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        "knowledge_search"
    }

    fn description(&self) -> &str {
        "Search the knowledge base for documents relevant to a query"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find relevant documents"
                },
                "top_k": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of results to return. Uses the retriever default if omitted."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RagError::tool(self.name(), "missing required 'query' parameter"))?;

        let top_k = match args.get("top_k") {
            None | Some(Value::Null) => None,
            Some(raw) => match raw.as_u64() {
                Some(k) if k >= 1 => Some(k as usize),
                _ => {
                    return Err(RagError::tool(
                        self.name(),
                        format!("'top_k' must be a positive integer, got {raw}"),
                    ));
                }
            },
        };

        info!(query, top_k, "knowledge_search tool called");

        let results = self
            .retriever
            .retrieve_scored(query, RetrieveOptions { top_k })
            .await
            .inspect_err(|e| error!(error = %e, "knowledge_search failed"))?;

        serde_json::to_value(&results).map_err(|e| {
            error!(error = %e, "failed to serialize search results");
            RagError::tool(self.name(), format!("failed to serialize results: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Vector};
    use crate::embedding::{Embedder, HashingEmbedder};
    use crate::inmemory::InMemoryVectorStore;
    use crate::vectorstore::VectorStore;

    async fn tool_with(docs: &[(&str, &str)]) -> RetrieverTool {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let store = Arc::new(InMemoryVectorStore::new(64));
        for (id, content) in docs {
            let values = embedder.embed(content).await.unwrap();
            store.upsert(&[Vector::from_document(&Document::new(*id, *content), values)]).await.unwrap();
        }
        RetrieverTool::new(Arc::new(Retriever::new(embedder, store)))
    }

    #[tokio::test]
    async fn returns_scored_documents() {
        let tool = tool_with(&[("1", "refund policy is 30 days"), ("2", "office hours are 9 to 5")]).await;
        let value = tool.execute(json!({ "query": "refund policy", "top_k": 1 })).await.unwrap();

        let results = value.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["document"]["id"], "1");
    }

    #[tokio::test]
    async fn invalid_top_k_is_a_tool_error() {
        let tool = tool_with(&[("1", "refund policy is 30 days")]).await;
        for top_k in [json!(-1), json!(0), json!(2.5), json!("3")] {
            let err = tool.execute(json!({ "query": "refund", "top_k": top_k })).await.unwrap_err();
            assert!(matches!(err, RagError::Tool { ref name, .. } if name == "knowledge_search"), "{err:?}");
        }
    }

    #[tokio::test]
    async fn missing_query_is_a_tool_error() {
        let tool = tool_with(&[]).await;
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, RagError::Tool { .. }));
    }
}

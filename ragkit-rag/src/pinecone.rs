//! Pinecone vector store backend.
//!
//! Provides [`PineconeVectorStore`] which implements [`VectorStore`] against
//! the Pinecone data-plane REST API of a single index host.
//!
//! This module is only available when the `pinecone` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit_rag::pinecone::PineconeVectorStore;
//!
//! let store = PineconeVectorStore::new(api_key, "my-index-abc123.svc.pinecone.io", 1024)?;
//! store.upsert(&vectors).await?;
//! let matches = store.query_by_vector(&query_embedding, 5).await?;
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::document::{ScoredVector, Vector};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "pinecone";

/// Data-plane API version sent with every request.
const API_VERSION: &str = "2024-07";

/// A [`VectorStore`] backed by a [Pinecone](https://www.pinecone.io/) index.
///
/// Metadata is stored as Pinecone metadata; values are never fetched back
/// on query.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    namespace: Option<String>,
    dimensions: usize,
}

impl PineconeVectorStore {
    /// Connect to the index served at `host`.
    ///
    /// `host` may omit the scheme, in which case `https://` is assumed.
    pub fn new(api_key: impl Into<String>, host: &str, dimensions: usize) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Config("Pinecone API key must not be empty".into()));
        }
        if host.is_empty() {
            return Err(RagError::Config("Pinecone index host must not be empty".into()));
        }

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        Ok(Self { client: reqwest::Client::new(), api_key, base_url, namespace: None, dimensions })
    }

    /// Connect using the `PINECONE_APIKEY` and `PINECONE_HOST` environment variables.
    pub fn from_env(dimensions: usize) -> Result<Self> {
        let api_key = std::env::var("PINECONE_APIKEY")
            .map_err(|_| RagError::Config("PINECONE_APIKEY environment variable not set".into()))?;
        let host = std::env::var("PINECONE_HOST")
            .map_err(|_| RagError::Config("PINECONE_HOST environment variable not set".into()))?;
        Self::new(api_key, &host, dimensions)
    }

    /// Scope all operations to a namespace within the index.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimensions {
            return Err(RagError::DimensionMismatch { expected: self.dimensions, actual });
        }
        Ok(())
    }

    fn unavailable(message: String) -> RagError {
        RagError::StoreUnavailable { backend: BACKEND.to_string(), message }
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = BACKEND, path, error = %e, "request failed");
                Self::unavailable(format!("request to {path} failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(backend = BACKEND, path, %status, "API error");
            return Err(Self::unavailable(format!("{path} returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("failed to parse {path} response: {e}")))
    }
}

// ── Pinecone API request/response types ────────────────────────────

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, vectors: &[Vector]) -> Result<usize> {
        if vectors.is_empty() {
            return Ok(0);
        }
        for vector in vectors {
            self.check_dimension(vector.values.len())?;
        }

        let request = UpsertRequest {
            vectors: vectors
                .iter()
                .map(|v| UpsertVector { id: &v.id, values: &v.values, metadata: &v.metadata })
                .collect(),
            namespace: self.namespace.as_deref(),
        };
        let response: UpsertResponse = self.post("/vectors/upsert", &request).await?;

        debug!(backend = BACKEND, count = response.upserted_count, "upserted vectors");
        Ok(response.upserted_count)
    }

    async fn query_by_vector(&self, values: &[f32], top_k: usize) -> Result<Vec<ScoredVector>> {
        self.check_dimension(values.len())?;

        let request = QueryRequest {
            vector: values,
            top_k,
            include_values: false,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };
        let response: QueryResponse = self.post("/query", &request).await?;

        let mut matches: Vec<ScoredVector> = response
            .matches
            .into_iter()
            .map(|m| ScoredVector { id: m.id, score: m.score, metadata: m.metadata.unwrap_or_default() })
            .collect();
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete(&self, ids: &[&str]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let request = DeleteRequest { ids, namespace: self.namespace.as_deref() };
        let _: Value = self.post("/vectors/delete", &request).await?;
        debug!(backend = BACKEND, count = ids.len(), "deleted vectors");
        Ok(ids.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_without_scheme_gets_https() {
        let store = PineconeVectorStore::new("key", "idx.svc.pinecone.io/", 8).unwrap();
        assert_eq!(store.base_url, "https://idx.svc.pinecone.io");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(matches!(PineconeVectorStore::new("", "host", 8), Err(RagError::Config(_))));
        assert!(matches!(PineconeVectorStore::new("key", "", 8), Err(RagError::Config(_))));
    }

    #[test]
    fn query_request_uses_camel_case() {
        let body = serde_json::to_value(QueryRequest {
            vector: &[0.5],
            top_k: 3,
            include_values: false,
            include_metadata: true,
            namespace: None,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "vector": [0.5], "topK": 3, "includeValues": false, "includeMetadata": true
            })
        );
    }
}

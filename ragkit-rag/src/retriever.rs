//! Query-time retrieval: embed a query and fetch the closest documents.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::document::{Document, RetrievalResult, ScoredDocument};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Number of documents returned when no override is given.
pub const DEFAULT_TOP_K: usize = 3;

/// Per-call retrieval options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Overrides the retriever's default result count.
    pub top_k: Option<usize>,
}

impl RetrieveOptions {
    /// Options that override the result count.
    pub fn with_top_k(top_k: usize) -> Self {
        Self { top_k: Some(top_k) }
    }
}

/// Composes an [`Embedder`] and a [`VectorStore`] to answer "which documents
/// are most relevant to this query".
///
/// Errors from either collaborator propagate unchanged.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    default_top_k: usize,
}

impl Retriever {
    /// Create a retriever with [`DEFAULT_TOP_K`].
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store, default_top_k: DEFAULT_TOP_K }
    }

    /// Change the default result count.
    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// The result count used when options carry no override.
    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Return at most `top_k` documents most similar to `query`, most relevant first.
    pub async fn retrieve(&self, query: &str, options: RetrieveOptions) -> Result<Vec<Document>> {
        let scored = self.retrieve_scored(query, options).await?;
        Ok(scored.into_iter().map(|s| s.document).collect())
    }

    /// Like [`retrieve`](Self::retrieve) but keeps similarity scores.
    #[instrument(skip_all, fields(top_k = tracing::field::Empty))]
    pub async fn retrieve_scored(
        &self,
        query: &str,
        options: RetrieveOptions,
    ) -> Result<RetrievalResult> {
        let top_k = options.top_k.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        tracing::Span::current().record("top_k", top_k);

        // 1. Embed the query
        let query_vector = self.embedder.embed(query).await?;
        if query_vector.len() != self.embedder.dimensions() {
            return Err(RagError::Embedding {
                provider: "retriever".into(),
                message: format!(
                    "query embedding has dimension {}, expected {}",
                    query_vector.len(),
                    self.embedder.dimensions()
                ),
            });
        }

        // 2. Query the store
        let matches = self.store.query_by_vector(&query_vector, top_k).await?;

        // 3. Map metadata content back into documents, keeping store order
        let results = matches
            .into_iter()
            .take(top_k)
            .map(|m| {
                let content = m
                    .content()
                    .ok_or_else(|| RagError::MissingContent { id: m.id.clone() })?
                    .to_string();
                Ok(ScoredDocument { document: Document { id: m.id, content }, score: m.score })
            })
            .collect::<Result<RetrievalResult>>()?;

        debug!(top_k, result_count = results.len(), "retrieved documents");
        Ok(results)
    }
}

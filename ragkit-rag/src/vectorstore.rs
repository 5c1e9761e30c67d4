//! Vector store trait for storing and querying vector embeddings.

use async_trait::async_trait;

use crate::document::{ScoredVector, Vector};
use crate::error::Result;

/// A storage backend for vector embeddings with similarity search.
///
/// A store has a fixed dimension; every stored and queried vector must match
/// it. Implementations are shared across concurrent pipeline invocations and
/// must be safe to call from several tasks at once.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.upsert(&vectors).await?;
/// let matches = store.query_by_vector(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite vectors by id. Returns the number written.
    ///
    /// Fails with [`RagError::DimensionMismatch`](crate::RagError::DimensionMismatch)
    /// if any vector has the wrong length; nothing is written in that case.
    async fn upsert(&self, vectors: &[Vector]) -> Result<usize>;

    /// Return the `top_k` most similar vectors, ordered by descending score.
    ///
    /// Returns fewer than `top_k` matches when the store holds fewer vectors.
    /// Ties are broken in a store-defined, deterministic order.
    async fn query_by_vector(&self, values: &[f32], top_k: usize) -> Result<Vec<ScoredVector>>;

    /// Delete vectors by id. Returns the number removed.
    async fn delete(&self, ids: &[&str]) -> Result<usize>;

    /// The dimension every vector in this store must have.
    fn dimensions(&self) -> usize;
}

//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and small-scale use cases.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{ScoredVector, Vector};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory vector store using cosine similarity for search.
///
/// Vectors are stored by id. Equal scores are ordered by ascending id so that
/// results are deterministic for a fixed store state.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.upsert(&vectors).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    vectors: RwLock<HashMap<String, Vector>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store holding `dimensions`-length vectors.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, vectors: RwLock::new(HashMap::new()) }
    }

    /// Number of stored vectors.
    pub async fn len(&self) -> usize {
        self.vectors.read().await.len()
    }

    /// Whether the store holds no vectors.
    pub async fn is_empty(&self) -> bool {
        self.vectors.read().await.is_empty()
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimensions {
            return Err(RagError::DimensionMismatch { expected: self.dimensions, actual });
        }
        Ok(())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, vectors: &[Vector]) -> Result<usize> {
        for vector in vectors {
            self.check_dimension(vector.values.len())?;
        }

        let mut store = self.vectors.write().await;
        for vector in vectors {
            store.insert(vector.id.clone(), vector.clone());
        }
        debug!(backend = "InMemory", count = vectors.len(), "upserted vectors");
        Ok(vectors.len())
    }

    async fn query_by_vector(&self, values: &[f32], top_k: usize) -> Result<Vec<ScoredVector>> {
        self.check_dimension(values.len())?;

        let store = self.vectors.read().await;
        let mut scored: Vec<ScoredVector> = store
            .values()
            .map(|vector| ScoredVector {
                id: vector.id.clone(),
                score: cosine_similarity(&vector.values, values),
                metadata: vector.metadata.clone(),
            })
            .collect();
        drop(store);

        scored.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(&self, ids: &[&str]) -> Result<usize> {
        let mut store = self.vectors.write().await;
        let removed = ids.iter().filter(|id| store.remove(**id).is_some()).count();
        Ok(removed)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn vector(id: &str, content: &str, values: Vec<f32>) -> Vector {
        Vector::from_document(&Document::new(id, content), values)
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = InMemoryVectorStore::new(2);
        store.upsert(&[vector("1", "old", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(&[vector("1", "new", vec![1.0, 0.0])]).await.unwrap();

        assert_eq!(store.len().await, 1);
        let matches = store.query_by_vector(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(matches[0].content(), Some("new"));
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected_without_partial_write() {
        let store = InMemoryVectorStore::new(2);
        let err = store
            .upsert(&[vector("1", "a", vec![1.0, 0.0]), vector("2", "b", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 1 }));
        assert!(store.is_empty().await);

        let err = store.query_by_vector(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[tokio::test]
    async fn ties_are_ordered_by_id() {
        let store = InMemoryVectorStore::new(2);
        store
            .upsert(&[
                vector("b", "b", vec![1.0, 0.0]),
                vector("a", "a", vec![1.0, 0.0]),
                vector("c", "c", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let ids: Vec<String> = store
            .query_by_vector(&[1.0, 0.0], 3)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_reports_removed_count() {
        let store = InMemoryVectorStore::new(2);
        store.upsert(&[vector("1", "x", vec![1.0, 0.0])]).await.unwrap();
        assert_eq!(store.delete(&["1", "missing"]).await.unwrap(), 1);
        assert!(store.is_empty().await);
    }
}

//! Embedder trait for turning text into fixed-dimension vectors.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. [`embed_strings`](Embedder::embed_strings) is the primitive; it
/// must return exactly one vector per input, in input order, each of length
/// [`dimensions`](Embedder::dimensions).
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_rag::{Embedder, HashingEmbedder};
///
/// let embedder = HashingEmbedder::new(64);
/// let vectors = embedder.embed_strings(&["hello", "world"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of strings, one output vector per input.
    async fn embed_strings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_strings(&[text]).await?;
        vectors.pop().ok_or_else(|| RagError::Embedding {
            provider: "unknown".into(),
            message: "backend returned no vector".into(),
        })
    }

    /// The dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;
}

/// Check that a backend returned one vector per input, each of `dimensions` length.
///
/// Both failures are reported as [`RagError::Embedding`] so callers see a
/// single error kind for a misbehaving backend.
pub fn validate_embeddings(
    provider: &str,
    expected_count: usize,
    dimensions: usize,
    embeddings: &[Vec<f32>],
) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(RagError::Embedding {
            provider: provider.into(),
            message: format!("expected {expected_count} vectors, got {}", embeddings.len()),
        });
    }
    if let Some((index, bad)) = embeddings.iter().enumerate().find(|(_, v)| v.len() != dimensions)
    {
        return Err(RagError::Embedding {
            provider: provider.into(),
            message: format!(
                "vector {index} has dimension {}, expected {dimensions}",
                bad.len()
            ),
        });
    }
    Ok(())
}

/// A deterministic bag-of-words embedder that hashes terms into buckets.
///
/// Needs no network and no model files. Texts sharing words land near each
/// other, which is enough for tests and offline demos.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create an embedder producing `dimensions`-length vectors.
    ///
    /// A zero dimension is kept as given: [`dimensions`](Embedder::dimensions)
    /// reports 0 and every embed call fails with [`RagError::Embedding`].
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            *tf.entry(word).or_insert(0) += 1;
        }

        for (term, count) in &tf {
            vector[djb2(term) % self.dimensions] += *count as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn djb2(s: &str) -> usize {
    s.bytes().fold(5381usize, |hash, b| hash.wrapping_mul(33).wrapping_add(b as usize))
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_strings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.dimensions == 0 {
            return Err(RagError::Embedding {
                provider: "hashing".into(),
                message: "dimensions must be greater than zero".into(),
            });
        }
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(32);
        let a = embedder.embed("Contact phone number").await.unwrap();
        let b = embedder.embed("contact PHONE number").await.unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_text_yields_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        let v = embedder.embed("").await.unwrap();
        assert_eq!(v, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn zero_dimensions_is_an_embedding_error() {
        let embedder = HashingEmbedder::new(0);
        assert_eq!(embedder.dimensions(), 0);
        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding { provider, .. } if provider == "hashing"));
    }

    #[test]
    fn validate_rejects_wrong_count_and_dimension() {
        let ok = vec![vec![0.0; 4], vec![1.0; 4]];
        assert!(validate_embeddings("test", 2, 4, &ok).is_ok());

        let err = validate_embeddings("test", 3, 4, &ok).unwrap_err();
        assert!(matches!(err, RagError::Embedding { .. }));

        let bad = vec![vec![0.0; 4], vec![1.0; 3]];
        let err = validate_embeddings("test", 2, 4, &bad).unwrap_err();
        assert!(err.to_string().contains("vector 1 has dimension 3"));
    }
}

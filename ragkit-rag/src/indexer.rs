//! Loading markdown knowledge into a vector store.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::chunking::{Chunk, MarkdownHeaderSplitter};
use crate::document::{Document, Vector};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Splits, embeds and upserts documents.
///
/// Each chunk is stored under a sequential string id counted from the
/// configured start offset (`"0"`, `"1"`, ...). Re-indexing with the same
/// offset overwrites the previous vectors.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    splitter: MarkdownHeaderSplitter,
    start_id: usize,
}

impl Indexer {
    /// Create an indexer starting ids at `0`.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store, splitter: MarkdownHeaderSplitter::new(), start_id: 0 }
    }

    /// Set the first id assigned to a chunk.
    pub fn with_start_id(mut self, start_id: usize) -> Self {
        self.start_id = start_id;
        self
    }

    /// Read a markdown file and index its contents.
    ///
    /// Returns the number of vectors upserted.
    pub async fn index_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        info!(path = %path.display(), bytes = text.len(), "loaded knowledge file");
        self.index_text(&text).await
    }

    /// Split `text` on markdown headers and index each chunk.
    ///
    /// Returns the number of vectors upserted.
    #[instrument(skip_all, fields(start_id = self.start_id))]
    pub async fn index_text(&self, text: &str) -> Result<usize> {
        let chunks = self.splitter.split(text);
        if chunks.is_empty() {
            info!("no chunks to index");
            return Ok(0);
        }

        let documents = self.documents(&chunks);
        let contents: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedder.embed_strings(&contents).await?;
        if embeddings.len() != documents.len() {
            return Err(RagError::Embedding {
                provider: "indexer".to_string(),
                message: format!("expected {} embeddings, got {}", documents.len(), embeddings.len()),
            });
        }

        let vectors: Vec<Vector> = documents
            .iter()
            .zip(embeddings)
            .map(|(document, values)| Vector::from_document(document, values))
            .collect();

        let count = self.store.upsert(&vectors).await?;
        info!(chunks = chunks.len(), upserted = count, "indexed knowledge");
        Ok(count)
    }

    fn documents(&self, chunks: &[Chunk]) -> Vec<Document> {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| Document::new((self.start_id + i).to_string(), chunk.content.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::inmemory::InMemoryVectorStore;

    fn indexer(store: Arc<InMemoryVectorStore>) -> Indexer {
        Indexer::new(Arc::new(HashingEmbedder::new(32)), store)
    }

    #[tokio::test]
    async fn assigns_sequential_ids_from_offset() {
        let store = Arc::new(InMemoryVectorStore::new(32));
        let count = indexer(store.clone())
            .with_start_id(10)
            .index_text("# A\none\n# B\ntwo\n# C\nthree")
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(store.len().await, 3);

        let query = HashingEmbedder::new(32).embed("# B\ntwo").await.unwrap();
        let top = store.query_by_vector(&query, 1).await.unwrap();
        assert_eq!(top[0].id, "11");
        assert_eq!(top[0].content(), Some("# B\ntwo"));
    }

    #[tokio::test]
    async fn reindexing_overwrites() {
        let store = Arc::new(InMemoryVectorStore::new(32));
        let indexer = indexer(store.clone());
        indexer.index_text("# A\none\n# B\ntwo").await.unwrap();
        indexer.index_text("# A\none\n# B\ntwo").await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn empty_text_indexes_nothing() {
        let store = Arc::new(InMemoryVectorStore::new(32));
        assert_eq!(indexer(store.clone()).index_text("\n").await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let store = Arc::new(InMemoryVectorStore::new(32));
        let err = indexer(store).index_file("/nonexistent/knowledge.md").await.unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }
}

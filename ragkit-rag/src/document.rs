//! Data types for documents, stored vectors, and retrieval results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key under which a vector's source text is stored.
pub const CONTENT_KEY: &str = "content";

/// A unit of retrievable knowledge. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub content: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into() }
    }
}

/// An embedding stored in a [`VectorStore`](crate::VectorStore).
///
/// Created at ingestion time and never mutated; re-upserting the same `id`
/// replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    /// Unique identifier within the store.
    pub id: String,
    /// The embedding values. Length must equal the store dimension.
    pub values: Vec<f32>,
    /// Arbitrary metadata; the source text lives under [`CONTENT_KEY`].
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Vector {
    /// Create a vector for `document` with its content recorded in metadata.
    pub fn from_document(document: &Document, values: Vec<f32>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(CONTENT_KEY.to_string(), Value::String(document.content.clone()));
        Self { id: document.id.clone(), values, metadata }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single vector store match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredVector {
    /// The id of the matched vector.
    pub id: String,
    /// The similarity score (higher is more relevant).
    pub score: f32,
    /// The metadata stored with the vector.
    pub metadata: Map<String, Value>,
}

impl ScoredVector {
    /// The string content stored in metadata, if any.
    pub fn content(&self) -> Option<&str> {
        self.metadata.get(CONTENT_KEY).and_then(Value::as_str)
    }
}

/// A retrieved [`Document`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredDocument {
    /// The retrieved document.
    pub document: Document,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Documents ordered by descending similarity, at most `top_k` long.
pub type RetrievalResult = Vec<ScoredDocument>;

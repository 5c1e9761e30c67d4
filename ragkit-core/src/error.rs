//! Error types shared by every ragkit crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur anywhere in a ragkit pipeline.
///
/// Component errors are surfaced to the pipeline caller unchanged; there is
/// no automatic retry or fallback.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding backend failed or returned malformed vectors.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector did not have the dimension the store or embedder expects.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The configured dimension.
        expected: usize,
        /// The dimension that was supplied.
        actual: usize,
    },

    /// The vector store could not be reached or rejected the request.
    #[error("Vector store unavailable ({backend}): {message}")]
    StoreUnavailable {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The message sequence lacks the System/User messages a stage needs.
    #[error("Insufficient context: {0}")]
    InsufficientContext(String),

    /// The chat model call failed.
    #[error("Generation error ({model}): {message}")]
    Generation {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// The invocation was cancelled before it produced a result.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// A pipeline stage did not finish within its time budget.
    #[error("Stage '{stage}' timed out after {after:?}")]
    Timeout {
        /// The stage that timed out.
        stage: &'static str,
        /// The elapsed budget.
        after: Duration,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A prompt template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// A store match carried no string `content` field in its metadata.
    #[error("Match '{id}' has no content in its metadata")]
    MissingContent {
        /// The id of the offending vector.
        id: String,
    },

    /// A tool lookup or execution failed.
    #[error("Tool error ({name}): {message}")]
    Tool {
        /// The tool that produced the error.
        name: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in pipeline orchestration itself (e.g. a branch task panicked).
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// An I/O error, typically while loading documents.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Shorthand for a [`RagError::Generation`] error.
    pub fn generation(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation { model: model.into(), message: message.into() }
    }

    /// Shorthand for a [`RagError::Tool`] error.
    pub fn tool(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { name: name.into(), message: message.into() }
    }

    /// Whether this error came from cancellation rather than a component failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A convenience result type for ragkit operations.
pub type Result<T> = std::result::Result<T, RagError>;

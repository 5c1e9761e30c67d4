//! Error types for the `ragkit-rag` crate.
//!
//! Every RAG component reports failures through [`ragkit_core::RagError`] so
//! that errors reach the pipeline caller without translation.

pub use ragkit_core::error::{RagError, Result};

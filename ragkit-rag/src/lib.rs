//! # ragkit-rag
//!
//! Retrieval-augmented generation pipeline.
//!
//! ## Overview
//!
//! A [`Pipeline`] renders a chat template from the caller's input, then runs
//! two branches concurrently: one embeds the user query and retrieves the most
//! similar documents from a [`VectorStore`], the other passes the rendered
//! messages through. The [`PromptMerger`] folds the retrieved knowledge into the
//! user turn and a [`ChatModel`](ragkit_core::ChatModel) produces the answer.
//!
//! - [`Embedder`] - text to vectors ([`HashingEmbedder`], [`OpenAIEmbedder`])
//! - [`VectorStore`] - similarity search ([`InMemoryVectorStore`], [`PineconeVectorStore`])
//! - [`Retriever`] - embed a query and fetch the top-k documents
//! - [`Indexer`] - split markdown, embed and upsert
//! - [`RetrieverTool`] - expose retrieval to a tool-calling model
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit_rag::{HashingEmbedder, InMemoryVectorStore, Pipeline, PipelineConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = PipelineConfig::builder().embedding_dimension(256).build()?;
//! let pipeline = Pipeline::builder()
//!     .config(config)
//!     .embedder(Arc::new(HashingEmbedder::new(256)))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(256)))
//!     .chat_model(model)
//!     .build()?;
//!
//! let input = [("task".to_string(), "What is the support phone?".to_string())].into();
//! let answer = pipeline.invoke(&input, Default::default(), &CancellationToken::new()).await?;
//! ```
//!
//! ## Features
//!
//! - `openai` - OpenAI-compatible embeddings endpoint
//! - `pinecone` - Pinecone serverless index over REST

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod inmemory;
pub mod merger;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pinecone")]
pub mod pinecone;
pub mod pipeline;
pub mod retriever;
pub mod template;
pub mod tool;
pub mod vectorstore;

pub use chunking::{Chunk, MarkdownHeaderSplitter};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{CONTENT_KEY, Document, RetrievalResult, ScoredDocument, ScoredVector, Vector};
pub use embedding::{Embedder, HashingEmbedder};
pub use error::{RagError, Result};
pub use indexer::Indexer;
pub use inmemory::InMemoryVectorStore;
pub use merger::{ANSWER_INSTRUCTION, PromptMerger};
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbedder;
#[cfg(feature = "pinecone")]
pub use pinecone::PineconeVectorStore;
pub use pipeline::{
    DEFAULT_SYSTEM_PROMPT, FanoutResult, InvokeOptions, Pipeline, PipelineBuilder, PipelineInput,
    PipelineStage, TASK_KEY,
};
pub use retriever::{DEFAULT_TOP_K, RetrieveOptions, Retriever};
pub use template::ChatTemplate;
pub use tool::RetrieverTool;
pub use vectorstore::VectorStore;

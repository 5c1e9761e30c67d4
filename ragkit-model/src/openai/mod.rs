//! OpenAI provider.
//!
//! Talks to `/chat/completions` on the public API or any compatible server.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit_model::openai::{OpenAIChatModel, OpenAIConfig};
//!
//! // From OPENAI_API_KEY / OPENAI_BASE_URL / OPENAI_MODEL_NAME
//! let model = OpenAIChatModel::new(OpenAIConfig::from_env()?.with_temperature(0.7))?;
//!
//! // Self-hosted
//! let local = OpenAIChatModel::compatible("none", "http://localhost:8000/v1", "qwen2.5")?;
//! ```

mod client;
mod config;
mod convert;

pub use client::OpenAIChatModel;
pub use config::{DEFAULT_MODEL, OPENAI_API_BASE, OpenAIConfig};

//! # ragkit-model
//!
//! Chat model integrations for ragkit.
//!
//! ## Overview
//!
//! - [`OpenAIChatModel`] - OpenAI and OpenAI-compatible APIs (feature `openai`)
//! - [`MockChatModel`] - scripted model for tests and offline runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ragkit_model::openai::{OpenAIChatModel, OpenAIConfig};
//!
//! let model = OpenAIChatModel::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY").unwrap(),
//!     "gpt-4o-mini",
//! ))?;
//! ```
//!
//! ## Features
//!
//! - Tool/function calling with JSON arguments
//! - Generation configuration (temperature, max tokens)
//! - OpenAI-compatible APIs (vLLM, Ollama, proxies)

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::MockChatModel;
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatModel, OpenAIConfig};

//! # ragkit-core
//!
//! Shared vocabulary for the ragkit crates:
//!
//! - [`Message`] / [`Role`] / [`ToolCall`] - conversation data
//! - [`ChatModel`] / [`ChatRequest`] - the language model collaborator
//! - [`Tool`] / [`ToolSpec`] - tool declarations and execution
//! - [`RagError`] - the single error type surfaced by every component

pub mod error;
pub mod message;
pub mod model;
pub mod tool;

pub use error::{RagError, Result};
pub use message::{Message, Role, ToolCall};
pub use model::{ChatModel, ChatRequest, GenerationConfig};
pub use tool::{Tool, ToolSpec};

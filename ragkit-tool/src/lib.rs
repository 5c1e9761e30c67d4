//! # ragkit-tool
//!
//! Tool execution for tool-calling chat models.
//!
//! - [`FunctionTool`] - a [`Tool`](ragkit_core::Tool) backed by an async closure
//! - [`ToolsNode`] - executes the tool calls of an assistant message
//! - [`ToolAgent`] - generate, execute, resubmit until the model answers

pub mod agent;
pub mod function;
pub mod node;

pub use agent::{DEFAULT_MAX_ROUNDS, ToolAgent};
pub use function::FunctionTool;
pub use node::ToolsNode;

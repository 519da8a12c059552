//! Agent loop module.
//!
//! The [`Agent`] drives one conversation: it sends the history to the
//! reasoning oracle, dispatches requested tool calls through the registry
//! and stops on a final answer or at the iteration bound.

mod config;
mod runner;
mod state;

pub use config::{AgentConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT};
pub use runner::{Agent, AgentOutcome, ExecutedToolCall, ToolObserver};
pub use state::LoopState;

//! # sandbox-agent: a sandboxed tool layer for an LLM agent
//!
//! A reasoning oracle plans, and this crate acts. It gives the oracle four
//! filesystem and process primitives, all confined to a single working
//! directory, and drives the plan/act loop until the oracle answers or an
//! iteration bound is hit.
//!
//! ## Architecture
//!
//! - **PathGuard** (`tools::security`): resolves model-supplied paths and
//!   rejects anything outside the sandbox root
//! - **Tools** (`tools::builtins`): `list_directory`, `read_file`,
//!   `write_file`, `execute_script`
//! - **ToolRegistry** (`tools::registry`): name to tool dispatch with typed
//!   argument decoding
//! - **Agent** (`agent`): the bounded oracle/tool loop
//! - **Oracle clients** (`llm`): Gemini and OpenAI-compatible backends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sandbox_agent::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let guard = PathGuard::new("./calculator")?;
//!     let registry = ToolRegistry::new(guard, BuiltinTools::all());
//!     let oracle = create_client(&ProviderConfig::gemini(std::env::var("GEMINI_API_KEY")?))?;
//!
//!     let agent = Agent::new(Arc::from(oracle), registry, AgentConfig::default())?;
//!     let outcome = agent.run("What files are in the root?").await?;
//!     println!("{}", outcome.text);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod messages;
pub mod tools;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, AgentOutcome, ExecutedToolCall, LoopState};
    pub use crate::config::{AgentSettings, ProviderSettings, SandboxSettings};
    pub use crate::error::{AgentError, AgentErrorKind};
    pub use crate::llm::{
        create_client, LLMError, OracleResponse, ProviderConfig, ProviderType, ReasoningOracle,
    };
    pub use crate::logging::{LogLevel, LoggingConfig};
    pub use crate::messages::*;
    pub use crate::tools::{
        BuiltinTools, ContainmentError, PathGuard, ScriptPolicy, ToolError, ToolInvocation,
        ToolKind, ToolRegistry,
    };
}

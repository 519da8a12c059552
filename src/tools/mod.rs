//! Sandboxed tool system.
//!
//! - **Security**: [`PathGuard`] resolves caller paths and proves containment
//! - **Definitions**: tool names and typed arguments decoded once per call
//! - **Builtins**: the four primitives (`list_directory`, `read_file`,
//!   `write_file`, `execute_script`)
//! - **Registry**: name to schema and handler, with the root injected
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                       Tool Registry                          |
//! |                                                              |
//! |  dispatch(name, args) --> ToolInvocation::decode             |
//! |                       --> BuiltinTools::run(guard, ..)       |
//! |                       --> PathGuard::resolve                 |
//! |                                                              |
//! +-------------------------------------------------------------+
//! ```

pub mod builtins;
pub mod definition;
pub mod error;
pub mod registry;
pub mod security;

// Re-exports
pub use crate::messages::ToolDefinition;
pub use builtins::{BuiltinTools, ScriptPolicy};
pub use definition::{ToolInvocation, ToolKind};
pub use error::{ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
pub use security::{ContainmentError, PathGuard, ResolvedPath};

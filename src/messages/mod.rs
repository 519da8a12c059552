//! Message types shared by the agent loop, the tool registry and the oracle clients.

mod types;

pub use types::*;

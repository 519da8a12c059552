//! Agent loop configuration.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};

/// Default bound on oracle calls per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Default system instruction sent with every oracle call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful AI coding agent.

When a user asks a question or makes a request, make a function call plan. You can perform the following operations:

- List files and directories
- Read file contents
- Execute Python files with optional arguments
- Write or overwrite files

All paths you provide should be relative to the working directory. You do not need to specify the working directory in your function calls as it is automatically injected for security reasons.
";

/// Configuration for an agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// The system instruction that defines the agent's behavior
    pub system_prompt: String,
    /// Maximum number of oracle calls before giving up
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl AgentConfig {
    /// Creates a configuration with the given system instruction.
    ///
    /// # Examples
    ///
    /// ```
    /// use sandbox_agent::agent::AgentConfig;
    ///
    /// let config = AgentConfig::new("You are a careful refactoring assistant.");
    /// assert_eq!(config.max_iterations, 20);
    /// ```
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the iteration bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_iterations` is zero.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_iterations == 0 {
            return Err(AgentError::configuration(
                "max_iterations",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

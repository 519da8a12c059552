//! Agent-level error types.
//!
//! Tool failures never show up here: they are rendered to text and returned
//! to the oracle. Only oracle failures, the iteration bound and bad
//! configuration end a run.
//!
//! No external error crates (anyhow, thiserror, eyre) are used in the library.

use crate::llm::LLMError;
use crate::tools::security::RootError;
use std::fmt;

/// Errors that end an agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    /// The specific error that occurred
    pub kind: AgentErrorKind,
}

/// Specific agent error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentErrorKind {
    /// The oracle kept requesting tools past the iteration bound
    IterationLimitReached {
        /// The bound that was hit
        limit: usize,
    },
    /// The oracle call failed
    Oracle {
        /// The underlying client error
        error: LLMError,
    },
    /// Configuration error
    Configuration {
        /// The configuration field that was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
}

impl AgentError {
    /// Creates a new AgentError with the given kind.
    #[must_use]
    pub fn new(kind: AgentErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an iteration limit error.
    #[must_use]
    pub fn iteration_limit_reached(limit: usize) -> Self {
        Self::new(AgentErrorKind::IterationLimitReached { limit })
    }

    /// Creates an oracle error.
    #[must_use]
    pub fn oracle(error: LLMError) -> Self {
        Self::new(AgentErrorKind::Oracle { error })
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the run hit the iteration bound.
    #[must_use]
    pub fn is_iteration_limit(&self) -> bool {
        matches!(self.kind, AgentErrorKind::IterationLimitReached { .. })
    }

    /// Returns true if the oracle call failed.
    #[must_use]
    pub fn is_oracle(&self) -> bool {
        matches!(self.kind, AgentErrorKind::Oracle { .. })
    }
}

impl From<LLMError> for AgentError {
    fn from(error: LLMError) -> Self {
        Self::oracle(error)
    }
}

impl From<RootError> for AgentError {
    fn from(error: RootError) -> Self {
        Self::configuration("working_dir", error.to_string())
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AgentErrorKind::IterationLimitReached { limit } => {
                write!(
                    f,
                    "no final answer after {} iterations; raise max_iterations or simplify the request",
                    limit
                )
            }
            AgentErrorKind::Oracle { error } => {
                write!(f, "reasoning oracle failed: {}", error)
            }
            AgentErrorKind::Configuration { field, reason } => {
                write!(f, "invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AgentErrorKind::Oracle { error } => Some(error),
            _ => None,
        }
    }
}

//! Agent loop states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the agent loop currently is.
///
/// `AwaitingOracle -> {Finished | DispatchingTools} -> AwaitingOracle -> ...`
/// until `Finished` or `IterationLimitReached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoopState {
    /// Waiting for the oracle's next response
    #[default]
    AwaitingOracle,
    /// Running the tool calls the oracle requested
    DispatchingTools,
    /// The oracle produced a final answer
    Finished,
    /// The iteration bound was hit without a final answer
    IterationLimitReached,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingOracle => write!(f, "awaiting_oracle"),
            Self::DispatchingTools => write!(f, "dispatching_tools"),
            Self::Finished => write!(f, "finished"),
            Self::IterationLimitReached => write!(f, "iteration_limit_reached"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_awaiting_oracle() {
        assert_eq!(LoopState::default(), LoopState::AwaitingOracle);
    }

    #[test]
    fn display_format() {
        assert_eq!(LoopState::AwaitingOracle.to_string(), "awaiting_oracle");
        assert_eq!(LoopState::DispatchingTools.to_string(), "dispatching_tools");
        assert_eq!(LoopState::Finished.to_string(), "finished");
        assert_eq!(
            LoopState::IterationLimitReached.to_string(),
            "iteration_limit_reached"
        );
    }
}

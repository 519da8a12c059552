//! Tool Registry implementation.
//!
//! The registry owns the working-root [`PathGuard`] and the enabled built-in
//! tools. It exposes the tool definitions to the oracle and dispatches calls
//! by name, injecting the root itself.

use crate::messages::{ToolCall, ToolDefinition};
use crate::tools::builtins::BuiltinTools;
use crate::tools::definition::ToolInvocation;
use crate::tools::error::ToolError;
use crate::tools::security::PathGuard;
use futures::future::join_all;
use serde_json::Value;

/// Dispatch table from tool name to schema and handler.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    /// Containment boundary for every tool call
    guard: PathGuard,
    /// Enabled tools
    tools: BuiltinTools,
}

impl ToolRegistry {
    /// Creates a registry serving `tools` inside `guard`'s root.
    #[must_use]
    pub fn new(guard: PathGuard, tools: BuiltinTools) -> Self {
        tracing::debug!(
            root = %guard.root().display(),
            tools_count = tools.len(),
            "Tool Registry ready"
        );
        Self { guard, tools }
    }

    /// Returns the tool definitions, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Dispatches one call by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` for an unregistered name, `InvalidArguments` if
    /// the arguments do not decode, or the tool's own failure.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<String, ToolError> {
        let kind = self.tools.get(name).ok_or_else(|| {
            tracing::warn!(tool_name = name, "Unknown tool requested");
            ToolError::unknown_tool(name)
        })?;

        let invocation = ToolInvocation::decode(kind, arguments)?;
        tracing::debug!(tool_name = name, "Dispatching tool");

        let result = self.tools.run(&self.guard, invocation).await;
        if let Err(ref e) = result {
            if e.is_containment() {
                tracing::warn!(tool_name = name, error = %e, "Tool call rejected by containment");
            } else {
                tracing::debug!(tool_name = name, error = %e, "Tool call failed");
            }
        }
        result
    }

    /// Dispatches a batch of calls concurrently.
    ///
    /// Results are returned in the order of `calls`.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<Result<String, ToolError>> {
        join_all(
            calls
                .iter()
                .map(|call| self.dispatch(&call.name, &call.arguments)),
        )
        .await
    }
}

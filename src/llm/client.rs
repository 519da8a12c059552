//! Reasoning oracle trait abstraction.
//!
//! The agent loop talks to any model backend through [`ReasoningOracle`],
//! so Gemini, OpenAI-compatible servers and scripted test doubles are
//! interchangeable.

use crate::llm::error::LLMError;
use crate::messages::{Message, TokenUsage, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// One round of oracle output.
///
/// An empty `tool_calls` means the oracle is done and `text` is its answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleResponse {
    /// Text produced alongside or instead of tool calls
    pub text: Option<String>,
    /// Tool calls requested by the model, in order
    pub tool_calls: Vec<ToolCall>,
    /// Token counters for this round
    pub usage: TokenUsage,
}

impl OracleResponse {
    /// Creates a final-answer response.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates a response requesting tool calls.
    #[must_use]
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }

    /// Attaches token counters.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Returns true if the model requested no tools.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Trait for reasoning oracle clients.
///
/// # Example
///
/// ```ignore
/// use sandbox_agent::llm::{GeminiClient, ProviderConfig, ReasoningOracle};
///
/// let client = GeminiClient::new(ProviderConfig::gemini(api_key))?;
///
/// let messages = vec![Message::user("What files are in the root?")];
/// let response = client.generate(&messages, &tools, SYSTEM_PROMPT).await?;
/// ```
#[async_trait]
pub trait ReasoningOracle: Send + Sync + std::fmt::Debug {
    /// Sends the full conversation and tool manifest to the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is unusable.
    async fn generate(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
        system_instruction: &str,
    ) -> Result<OracleResponse, LLMError>;

    /// Returns the name of this provider for logging.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_response_is_final() {
        let response = OracleResponse::text("done");
        assert!(response.is_final());
        assert_eq!(response.text.as_deref(), Some("done"));
    }

    #[test]
    fn tool_call_response_is_not_final() {
        let response = OracleResponse::tool_calls(vec![ToolCall::new(
            "call_1_0",
            "list_directory",
            serde_json::json!({}),
        )])
        .with_usage(TokenUsage::new(12, 3));

        assert!(!response.is_final());
        assert_eq!(response.usage, TokenUsage::new(12, 3));
    }
}

//! The agent loop.
//!
//! Sends the conversation to the oracle, runs whatever tools it asks for,
//! appends their results in request order and repeats until the oracle
//! answers without tool calls or the iteration bound is hit.

use crate::agent::config::AgentConfig;
use crate::agent::state::LoopState;
use crate::error::AgentError;
use crate::llm::ReasoningOracle;
use crate::messages::{Message, TokenUsage, ToolCall};
use crate::tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Callback invoked after each tool call completes.
pub type ToolObserver = Box<dyn Fn(&ExecutedToolCall) + Send + Sync>;

/// A tool call the loop ran, with the text the oracle saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedToolCall {
    /// Call ID echoed back to the oracle
    pub id: String,
    /// Tool name as requested
    pub name: String,
    /// Raw arguments as requested
    pub arguments: serde_json::Value,
    /// Result text, or the rendered error
    pub result: String,
    /// Whether the tool succeeded
    pub success: bool,
}

/// The result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// The oracle's final answer
    pub text: String,
    /// Number of oracle calls made
    pub iterations: usize,
    /// Token counters summed over all oracle calls
    pub usage: TokenUsage,
    /// The full conversation, ending with the final answer
    pub conversation: Vec<Message>,
    /// Every tool call that ran, in order
    pub tool_calls: Vec<ExecutedToolCall>,
}

/// Drives one conversation between an oracle and a tool registry.
pub struct Agent {
    oracle: Arc<dyn ReasoningOracle>,
    registry: ToolRegistry,
    config: AgentConfig,
    observer: Option<ToolObserver>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("oracle", &self.oracle)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Agent {
    /// Creates an agent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        registry: ToolRegistry,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            oracle,
            registry,
            config,
            observer: None,
        })
    }

    /// Registers a callback run after every tool call.
    #[must_use]
    pub fn with_tool_observer(
        mut self,
        observer: impl Fn(&ExecutedToolCall) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Returns the tool registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Runs the loop for one user prompt.
    ///
    /// # Errors
    ///
    /// Returns `Oracle` if an oracle call fails and `IterationLimitReached`
    /// if no final answer arrives within `max_iterations` calls. Tool
    /// failures are not errors here; the oracle sees them as text.
    pub async fn run(&self, prompt: impl Into<String>) -> Result<AgentOutcome, AgentError> {
        let tools = self.registry.definitions();
        let mut conversation = vec![Message::user(prompt)];
        let mut usage = TokenUsage::default();
        let mut executed = Vec::new();
        let mut state = LoopState::AwaitingOracle;

        for iteration in 1..=self.config.max_iterations {
            tracing::debug!(iteration, %state, messages = conversation.len(), "Calling oracle");

            let response = self
                .oracle
                .generate(&conversation, &tools, &self.config.system_prompt)
                .await?;
            usage.accumulate(response.usage);

            if response.is_final() {
                state = LoopState::Finished;
                let text = response.text.unwrap_or_default();
                conversation.push(Message::assistant(text.clone()));
                tracing::info!(
                    iteration,
                    %state,
                    prompt_tokens = usage.prompt_tokens,
                    response_tokens = usage.response_tokens,
                    "Agent finished"
                );
                return Ok(AgentOutcome {
                    text,
                    iterations: iteration,
                    usage,
                    conversation,
                    tool_calls: executed,
                });
            }

            state = LoopState::DispatchingTools;
            let calls = assign_call_ids(iteration, response.tool_calls);
            tracing::info!(iteration, %state, count = calls.len(), "Dispatching tool calls");

            conversation.push(Message::assistant_with_tools(
                response.text.unwrap_or_default(),
                calls.clone(),
            ));

            let results = self.registry.dispatch_all(&calls).await;
            for (call, result) in calls.into_iter().zip(results) {
                let (text, success) = match result {
                    Ok(text) => (text, true),
                    Err(e) => (e.to_tool_text(), false),
                };
                conversation.push(Message::tool(&call, text.clone()));

                let record = ExecutedToolCall {
                    id: call.id,
                    name: call.name,
                    arguments: call.arguments,
                    result: text,
                    success,
                };
                if let Some(observer) = &self.observer {
                    observer(&record);
                }
                executed.push(record);
            }

            state = LoopState::AwaitingOracle;
        }

        state = LoopState::IterationLimitReached;
        tracing::warn!(
            limit = self.config.max_iterations,
            %state,
            tool_calls = executed.len(),
            "Agent stopped without a final answer"
        );
        Err(AgentError::iteration_limit_reached(self.config.max_iterations))
    }
}

/// Gives every call an ID, keeping ones the oracle supplied.
fn assign_call_ids(iteration: usize, calls: Vec<ToolCall>) -> Vec<ToolCall> {
    calls
        .into_iter()
        .enumerate()
        .map(|(index, mut call)| {
            if call.id.is_empty() {
                call.id = format!("call_{iteration}_{index}");
            }
            call
        })
        .collect()
}

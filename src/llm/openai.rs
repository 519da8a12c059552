//! OpenAI-compatible API client.
//!
//! HTTP client for OpenAI-compatible chat completions endpoints including
//! OpenAI, Ollama, vLLM and LocalAI.

use crate::llm::client::{OracleResponse, ReasoningOracle};
use crate::llm::config::ProviderConfig;
use crate::llm::error::LLMError;
use crate::messages::{Message, MessageRole, TokenUsage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for OpenAI-compatible APIs (OpenAI, Ollama, vLLM, LocalAI, etc.).
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    /// HTTP client
    client: Client,
    /// Chat completions URL
    endpoint: String,
    /// API key (optional for local providers like Ollama)
    api_key: Option<String>,
    /// Model name
    model: String,
    /// Maximum tokens to generate
    max_tokens: u32,
    /// Per-request limit, reported when a request times out
    timeout: Duration,
}

/// Request body for OpenAI chat completions API.
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    stream: bool,
}

/// A message in OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// A tool definition in OpenAI format.
#[derive(Debug, Clone, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

/// A function definition in OpenAI format.
#[derive(Debug, Clone, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// A tool call in OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: OpenAIFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// A function call in OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

/// Non-streaming response from OpenAI API.
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

/// A choice in the response.
#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionChoice {
    message: OpenAIMessage,
}

/// Token usage block.
#[derive(Debug, Clone, Copy, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Error response from OpenAI API.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

impl OpenAIClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// # Errors
    ///
    /// Returns `LLMError::network` if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self, LLMError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::network(format!("failed to create HTTP client: {}", e)))?;

        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };

        Ok(Self {
            client,
            endpoint: config.chat_completions_endpoint(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    /// Converts the conversation to OpenAI API format.
    fn convert_messages(&self, system_instruction: &str, messages: &[Message]) -> Vec<OpenAIMessage> {
        let system = (!system_instruction.is_empty()).then(|| OpenAIMessage {
            role: "system".to_string(),
            content: Some(system_instruction.to_string()),
            tool_calls: None,
            tool_call_id: None,
        });

        system
            .into_iter()
            .chain(messages.iter().map(|msg| match msg.role {
                MessageRole::User => OpenAIMessage {
                    role: "user".to_string(),
                    content: Some(msg.content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                MessageRole::Assistant => {
                    let tool_calls = msg.tool_calls.as_ref().map(|tcs| {
                        tcs.iter()
                            .map(|tc| OpenAIToolCall {
                                id: tc.id.clone(),
                                call_type: function_type(),
                                function: OpenAIFunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.to_string(),
                                },
                            })
                            .collect()
                    });

                    OpenAIMessage {
                        role: "assistant".to_string(),
                        content: if msg.content.is_empty() {
                            None
                        } else {
                            Some(msg.content.clone())
                        },
                        tool_calls,
                        tool_call_id: None,
                    }
                }
                MessageRole::Tool => OpenAIMessage {
                    role: "tool".to_string(),
                    content: Some(msg.content.clone()),
                    tool_calls: None,
                    tool_call_id: msg.tool_call_id.clone(),
                },
            }))
            .collect()
    }

    /// Converts tool definitions to OpenAI API format.
    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAITool> {
        tools
            .iter()
            .map(|t| OpenAITool {
                tool_type: function_type(),
                function: OpenAIFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                },
            })
            .collect()
    }

    /// Parses an error response from the API.
    async fn parse_error_response(&self, response: reqwest::Response) -> LLMError {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<OpenAIErrorResponse>(&error_body) {
            match api_error.error.error_type.as_deref() {
                Some("authentication_error" | "invalid_api_key") => {
                    LLMError::authentication_failed(&api_error.error.message)
                }
                Some("invalid_request_error") if status_code == 400 => {
                    LLMError::invalid_request(&api_error.error.message)
                }
                _ => LLMError::from_status(
                    status_code,
                    &api_error.error.message,
                    retry_after,
                    api_error.error.error_type.clone(),
                ),
            }
        } else {
            let message = if error_body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error")
            } else {
                &error_body
            };
            LLMError::from_status(status_code, message, retry_after, None)
        }
    }

    /// Extracts text, tool calls and usage from a completion.
    fn into_oracle_response(completion: ChatCompletionResponse) -> Result<OracleResponse, LLMError> {
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::parse_error("response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                // Malformed JSON is passed through as a string so the call
                // fails argument decoding and the model sees why.
                let arguments = serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments));
                ToolCall::new(tc.id, tc.function.name, arguments)
            })
            .collect();

        let usage = completion
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(OracleResponse {
            text: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls,
            usage,
        })
    }
}

#[async_trait]
impl ReasoningOracle for OpenAIClient {
    async fn generate(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
        system_instruction: &str,
    ) -> Result<OracleResponse, LLMError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            max_tokens: Some(self.max_tokens),
            messages: self.convert_messages(system_instruction, conversation),
            tools: (!tools.is_empty()).then(|| self.convert_tools(tools)),
            stream: false,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&request_body);

        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        tracing::debug!(model = %self.model, messages = conversation.len(), "Sending chat completion");

        let response = request
            .send()
            .await
            .map_err(|e| LLMError::transport(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(self.parse_error_response(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| LLMError::transport(e, self.timeout))?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::parse_error(format!("failed to parse response: {}", e)))?;

        Self::into_oracle_response(completion)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

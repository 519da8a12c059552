//! Google Gemini API client.
//!
//! HTTP client for the Generative Language `generateContent` endpoint with
//! function calling.

use crate::llm::client::{OracleResponse, ReasoningOracle};
use crate::llm::config::ProviderConfig;
use crate::llm::error::LLMError;
use crate::messages::{Message, MessageRole, TokenUsage, ToolCall, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// Full `generateContent` URL for the configured model
    endpoint: String,
    /// API key sent as `x-goog-api-key`
    api_key: String,
    /// Model name
    model: String,
    /// Maximum tokens to generate
    max_tokens: u32,
    /// Per-request limit, reported when a request times out
    timeout: Duration,
}

/// Request body for `generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

/// One conversation turn in Gemini format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// A content part: text, a function call or a function response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

/// A function result sent back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Value,
}

/// Tool block holding the function declarations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// A function declaration in Gemini format.
#[derive(Debug, Clone, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

/// Response body from `generateContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

/// A response candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

/// Token counters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Why the prompt was refused, if it was.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Error response from the Gemini API.
#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if no API key is configured, or a network
    /// error if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self, LLMError> {
        if config.api_key.is_empty() {
            return Err(LLMError::invalid_config(
                "api_key",
                "the Gemini API requires a key; set GEMINI_API_KEY",
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.generate_content_endpoint(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    /// Converts the conversation to Gemini contents.
    ///
    /// Consecutive tool results are merged into one turn, matching the one
    /// model turn that requested them.
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = Vec::with_capacity(messages.len());

        for msg in messages {
            match msg.role {
                MessageRole::User => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![GeminiPart {
                        text: Some(msg.content.clone()),
                        ..GeminiPart::default()
                    }],
                }),
                MessageRole::Assistant => {
                    let mut parts = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(GeminiPart {
                            text: Some(msg.content.clone()),
                            ..GeminiPart::default()
                        });
                    }
                    parts.extend(msg.requested_calls().iter().map(|call| GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            id: None,
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..GeminiPart::default()
                    }));
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
                MessageRole::Tool => {
                    let part = GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            id: None,
                            name: msg.tool_name.clone().unwrap_or_default(),
                            response: serde_json::json!({ "result": msg.content }),
                        }),
                        ..GeminiPart::default()
                    };
                    match contents.last_mut() {
                        Some(last)
                            if last.parts.iter().all(|p| p.function_response.is_some())
                                && last.role.as_deref() == Some("user") =>
                        {
                            last.parts.push(part);
                        }
                        _ => contents.push(GeminiContent {
                            role: Some("user".to_string()),
                            parts: vec![part],
                        }),
                    }
                }
            }
        }

        contents
    }

    /// Converts tool definitions to a Gemini tool block.
    fn convert_tools(tools: &[ToolDefinition]) -> Vec<GeminiTool> {
        if tools.is_empty() {
            return Vec::new();
        }

        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: gemini_schema(&t.input_schema),
                })
                .collect(),
        }]
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

        match serde_json::from_str::<GeminiErrorResponse>(&error_body) {
            // An invalid key comes back as a plain 400.
            Ok(api_error) if api_error.error.message.contains("API key") => {
                LLMError::authentication_failed(api_error.error.message)
            }
            Ok(api_error) => LLMError::from_status(
                status_code,
                &api_error.error.message,
                retry_after,
                api_error.error.status.clone(),
            ),
            Err(_) => {
                let message = if error_body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error")
                } else {
                    &error_body
                };
                LLMError::from_status(status_code, message, retry_after, None)
            }
        }
    }

    /// Extracts text, tool calls and usage from a response.
    fn into_oracle_response(response: GenerateContentResponse) -> Result<OracleResponse, LLMError> {
        let usage = response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map_or_else(
                    || "response contained no candidates".to_string(),
                    |reason| format!("prompt blocked: {reason}"),
                );
            return Err(LLMError::parse_error(reason));
        };

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall::new(call.id.unwrap_or_default(), call.name, call.args));
            }
        }

        Ok(OracleResponse {
            text: (!text.is_empty()).then_some(text),
            tool_calls,
            usage,
        })
    }
}

/// Rewrites a JSON Schema into Gemini's dialect (upper-case type names).
fn gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl ReasoningOracle for GeminiClient {
    async fn generate(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
        system_instruction: &str,
    ) -> Result<OracleResponse, LLMError> {
        let request_body = GenerateContentRequest {
            contents: Self::convert_messages(conversation),
            system_instruction: (!system_instruction.is_empty()).then(|| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_instruction.to_string()),
                    ..GeminiPart::default()
                }],
            }),
            tools: Self::convert_tools(tools),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        };

        tracing::debug!(model = %self.model, messages = conversation.len(), "Sending generateContent");

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
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
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::parse_error(format!("failed to parse response: {}", e)))?;

        Self::into_oracle_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

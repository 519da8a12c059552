//! Reasoning oracle clients.
//!
//! The [`ReasoningOracle`] trait plus HTTP clients for Google Gemini and
//! OpenAI-compatible endpoints.

mod client;
mod config;
mod error;
mod gemini;
mod openai;

pub use client::{OracleResponse, ReasoningOracle};
pub use config::{ProviderConfig, ProviderType, DEFAULT_GEMINI_MODEL, GEMINI_BASE_URL};
pub use error::{LLMError, LLMErrorKind};
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

/// Builds the client matching `config.provider_type`.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed (for example, a
/// missing Gemini API key).
pub fn create_client(config: &ProviderConfig) -> Result<Box<dyn ReasoningOracle>, LLMError> {
    match config.provider_type {
        ProviderType::Gemini => Ok(Box::new(GeminiClient::new(config)?)),
        ProviderType::OpenAI { .. } => Ok(Box::new(OpenAIClient::new(config)?)),
    }
}

//! Oracle client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";

/// Default Gemini API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The type of oracle backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProviderType {
    /// Google Gemini `generateContent` API
    #[default]
    Gemini,
    /// OpenAI-compatible API (including Ollama, vLLM, LocalAI, etc.)
    OpenAI {
        /// Base URL for the API (e.g., "http://localhost:11434/v1" for Ollama)
        base_url: String,
    },
}

impl ProviderType {
    /// Creates an OpenAI-compatible provider with the given base URL.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>) -> Self {
        Self::OpenAI {
            base_url: base_url.into(),
        }
    }

    /// Creates an OpenAI-compatible provider configured for Ollama.
    #[must_use]
    pub fn ollama() -> Self {
        Self::openai_compatible("http://localhost:11434/v1")
    }

    /// Creates an OpenAI-compatible provider configured for OpenAI.
    #[must_use]
    pub fn openai() -> Self {
        Self::openai_compatible("https://api.openai.com/v1")
    }
}

/// Configuration for an oracle client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider
    pub provider_type: ProviderType,
    /// The API key for authentication (may be empty for local providers)
    pub api_key: String,
    /// The model to use
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::gemini("")
    }
}

impl ProviderConfig {
    /// Creates a configuration for Google Gemini.
    ///
    /// # Examples
    ///
    /// ```
    /// use sandbox_agent::llm::ProviderConfig;
    ///
    /// let config = ProviderConfig::gemini("AIza...");
    /// assert_eq!(config.model, "gemini-2.0-flash-001");
    /// ```
    #[must_use]
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::Gemini,
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            max_tokens: 4096,
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Creates a configuration for OpenAI.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::openai(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Creates a configuration for a local Ollama server.
    ///
    /// Ollama runs locally and does not require an API key.
    ///
    /// # Examples
    ///
    /// ```
    /// use sandbox_agent::llm::ProviderConfig;
    ///
    /// let config = ProviderConfig::ollama("qwen2.5:7b");
    /// assert!(config.api_key.is_empty());
    /// ```
    #[must_use]
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            provider_type: ProviderType::ollama(),
            api_key: String::new(),
            model: model.into(),
            max_tokens: 4096,
            base_url: "http://localhost:11434/v1".to_string(),
            timeout: Duration::from_secs(300), // Longer timeout for local inference
        }
    }

    /// Creates a configuration for a custom OpenAI-compatible endpoint.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url_string = base_url.into();
        Self {
            provider_type: ProviderType::openai_compatible(&base_url_string),
            api_key: String::new(),
            model: model.into(),
            max_tokens: 4096,
            base_url: base_url_string,
            timeout: Duration::from_secs(300),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the model to use.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum tokens to generate.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the base URL for the API.
    ///
    /// For OpenAI-compatible providers the provider type follows the URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        if let ProviderType::OpenAI { base_url } = &mut self.provider_type {
            base_url.clone_from(&self.base_url);
        }
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the Gemini `generateContent` URL for the configured model.
    #[must_use]
    pub fn generate_content_endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Returns the OpenAI chat completions URL.
    #[must_use]
    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gemini() {
        let config = ProviderConfig::default();
        assert_eq!(config.provider_type, ProviderType::Gemini);
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn gemini_endpoint() {
        let config = ProviderConfig::gemini("key");
        assert_eq!(
            config.generate_content_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-001:generateContent"
        );
    }

    #[test]
    fn openai_endpoint_trims_trailing_slash() {
        let config = ProviderConfig::openai_compatible("http://localhost:8080/v1/", "local");
        assert_eq!(
            config.chat_completions_endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn ollama_has_no_key_and_long_timeout() {
        let config = ProviderConfig::ollama("qwen2.5:7b");
        assert!(config.api_key.is_empty());
        assert_eq!(config.provider_type, ProviderType::ollama());
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn with_base_url_updates_openai_provider_type() {
        let config = ProviderConfig::openai("sk-test").with_base_url("https://proxy.example/v1");
        assert_eq!(
            config.provider_type,
            ProviderType::openai_compatible("https://proxy.example/v1")
        );
    }

    #[test]
    fn builder_pattern() {
        let config = ProviderConfig::gemini("key")
            .with_model("gemini-2.5-pro")
            .with_max_tokens(1024)
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}

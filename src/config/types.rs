//! Configuration types for sandbox-agent.
//!
//! These mirror the TOML file layout. Every field is optional in the file;
//! missing values fall back to the runtime defaults.

use crate::agent::{AgentConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT};
use crate::error::AgentError;
use crate::llm::{ProviderConfig, DEFAULT_GEMINI_MODEL};
use crate::logging::LoggingConfig;
use crate::tools::builtins::{BuiltinTools, MAX_READ_CHARS};
use crate::tools::ScriptPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Resolved settings for one agent process.
///
/// Built once at startup and passed by reference; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Sandbox root. Defaults to the current directory.
    pub working_dir: Option<PathBuf>,

    /// Bound on oracle calls per run.
    pub max_iterations: Option<usize>,

    /// Replaces the built-in system instruction.
    pub system_prompt: Option<String>,

    /// Oracle backend.
    pub provider: ProviderSettings,

    /// Tool limits and script policy.
    pub sandbox: SandboxSettings,

    /// File logging.
    pub logging: LoggingConfig,
}

impl AgentSettings {
    /// Creates settings with every value at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sandbox root.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the iteration bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Builds the agent loop configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_iterations` is zero.
    pub fn agent_config(&self) -> Result<AgentConfig, AgentError> {
        let config = AgentConfig::new(
            self.system_prompt
                .as_deref()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT),
        )
        .with_max_iterations(self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS));
        config.validate()?;
        Ok(config)
    }

    /// Builds the tool set from the `[sandbox]` section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown tool name or a zero limit.
    pub fn builtin_tools(&self) -> Result<BuiltinTools, AgentError> {
        let tools = match &self.sandbox.tools {
            Some(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                BuiltinTools::select(&names)
                    .map_err(|e| AgentError::configuration("sandbox.tools", e.to_string()))?
            }
            None => BuiltinTools::all(),
        };

        if self.sandbox.max_read_chars == 0 {
            return Err(AgentError::configuration(
                "sandbox.max_read_chars",
                "must be at least 1",
            ));
        }

        Ok(tools
            .with_read_limit(self.sandbox.max_read_chars)
            .with_script_policy(self.sandbox.to_script_policy()?))
    }
}

/// The `[provider]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider type: "gemini", "openai", or "ollama".
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model identifier. Each provider type has its own default.
    pub model: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// API key given directly. Prefer `api_key_env`.
    pub api_key: Option<String>,

    /// Base URL override.
    pub base_url: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider_type: "gemini".to_string(),
            model: None,
            api_key_env: None,
            api_key: None,
            base_url: None,
            max_tokens: None,
            timeout_secs: None,
        }
    }
}

impl ProviderSettings {
    /// Creates Gemini settings for the given model.
    #[must_use]
    pub fn gemini(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            ..Self::default()
        }
    }

    /// Creates OpenAI settings for the given model.
    #[must_use]
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            provider_type: "openai".to_string(),
            model: Some(model.into()),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            ..Self::default()
        }
    }

    /// Creates settings for a local Ollama server.
    #[must_use]
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            provider_type: "ollama".to_string(),
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Sets the API key directly.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Resolves the API key.
    ///
    /// Priority:
    /// 1. Environment variable named in `api_key_env`
    /// 2. Standard environment variable for the provider type
    /// 3. Direct `api_key` value
    /// 4. Empty string (local providers)
    #[must_use]
    pub fn resolve_api_key(&self) -> String {
        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                if !key.is_empty() {
                    return key;
                }
            }
        }

        let standard_env = match self.provider_type.to_lowercase().as_str() {
            "gemini" => Some("GEMINI_API_KEY"),
            "openai" => Some("OPENAI_API_KEY"),
            _ => None,
        };

        if let Some(env_var) = standard_env {
            if let Ok(key) = std::env::var(env_var) {
                if !key.is_empty() {
                    return key;
                }
            }
        }

        self.api_key.clone().unwrap_or_default()
    }

    /// Converts these settings to a runtime ProviderConfig.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider type.
    pub fn to_provider_config(&self) -> Result<ProviderConfig, AgentError> {
        let api_key = self.resolve_api_key();

        let mut config = match self.provider_type.to_lowercase().as_str() {
            "gemini" => ProviderConfig::gemini(&api_key)
                .with_model(self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)),
            "openai" => {
                let config = ProviderConfig::openai(&api_key);
                match self.model {
                    Some(ref model) => config.with_model(model),
                    None => config,
                }
            }
            "ollama" => {
                let model = self.model.as_deref().ok_or_else(|| {
                    AgentError::configuration("provider.model", "required for ollama")
                })?;
                ProviderConfig::ollama(model).with_api_key(&api_key)
            }
            other => {
                return Err(AgentError::configuration(
                    "provider.type",
                    format!("unknown provider '{other}'; expected gemini, openai, or ollama"),
                ))
            }
        };

        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url);
        }

        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(tokens) = self.max_tokens {
            config = config.with_max_tokens(tokens);
        }

        Ok(config)
    }
}

/// The `[sandbox]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Extension a script must carry, without the dot.
    pub script_extension: String,

    /// Interpreter used to run scripts.
    pub interpreter: String,

    /// Script wall-clock limit in seconds.
    pub timeout_secs: u64,

    /// Character cap for `read_file`.
    pub max_read_chars: usize,

    /// Subset of tools to expose. All four when absent.
    pub tools: Option<Vec<String>>,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        let policy = ScriptPolicy::default();
        Self {
            script_extension: policy.extension,
            interpreter: policy.interpreter,
            timeout_secs: policy.timeout.as_secs(),
            max_read_chars: MAX_READ_CHARS,
            tools: None,
        }
    }
}

impl SandboxSettings {
    /// Converts to the runtime script policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero timeout or an empty
    /// extension or interpreter.
    pub fn to_script_policy(&self) -> Result<ScriptPolicy, AgentError> {
        if self.timeout_secs == 0 {
            return Err(AgentError::configuration(
                "sandbox.timeout_secs",
                "must be at least 1",
            ));
        }
        let extension = self.script_extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(AgentError::configuration(
                "sandbox.script_extension",
                "must not be empty",
            ));
        }
        if self.interpreter.trim().is_empty() {
            return Err(AgentError::configuration(
                "sandbox.interpreter",
                "must not be empty",
            ));
        }

        Ok(ScriptPolicy::new(extension, self.interpreter.trim())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ProviderType;
    use crate::logging::LogLevel;

    #[test]
    fn defaults_match_runtime_defaults() {
        let settings = AgentSettings::default();
        let agent = settings.agent_config().unwrap();
        assert_eq!(agent, AgentConfig::default());

        let policy = settings.sandbox.to_script_policy().unwrap();
        assert_eq!(policy, ScriptPolicy::default());
        assert_eq!(settings.sandbox.max_read_chars, 10_000);
        assert_eq!(settings.provider.provider_type, "gemini");
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = AgentSettings::new()
            .with_max_iterations(0)
            .agent_config()
            .unwrap_err();
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn custom_system_prompt() {
        let settings = AgentSettings {
            system_prompt: Some("Only answer in haiku.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.agent_config().unwrap().system_prompt,
            "Only answer in haiku."
        );
    }

    #[test]
    fn tool_subset_and_limits() {
        let mut settings = AgentSettings::default();
        settings.sandbox.tools = Some(vec!["read_file".to_string(), "list_directory".to_string()]);
        settings.sandbox.max_read_chars = 50;

        let tools = settings.builtin_tools().unwrap();
        assert_eq!(tools.len(), 2);
        assert!(tools.get("write_file").is_none());
    }

    #[test]
    fn unknown_tool_in_subset_rejected() {
        let mut settings = AgentSettings::default();
        settings.sandbox.tools = Some(vec!["bash".to_string()]);
        let err = settings.builtin_tools().unwrap_err();
        assert!(err.to_string().contains("sandbox.tools"));
    }

    #[test]
    fn script_policy_validation() {
        let mut sandbox = SandboxSettings {
            script_extension: ".sh".to_string(),
            interpreter: "sh".to_string(),
            ..Default::default()
        };
        assert_eq!(sandbox.to_script_policy().unwrap().extension, "sh");

        sandbox.timeout_secs = 0;
        assert!(sandbox.to_script_policy().is_err());

        sandbox.timeout_secs = 5;
        sandbox.interpreter = "  ".to_string();
        assert!(sandbox.to_script_policy().is_err());
    }

    #[test]
    fn gemini_provider_config() {
        let provider = ProviderSettings::gemini("gemini-2.5-pro")
            .with_api_key("direct-key")
            .to_provider_config()
            .unwrap();
        assert_eq!(provider.provider_type, ProviderType::Gemini);
        assert_eq!(provider.model, "gemini-2.5-pro");
    }

    #[test]
    fn ollama_provider_config() {
        let mut settings = ProviderSettings::ollama("llama3.2");
        settings.timeout_secs = Some(60);
        settings.max_tokens = Some(1024);

        let provider = settings.to_provider_config().unwrap();
        assert_eq!(provider.model, "llama3.2");
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
        assert_eq!(provider.timeout, Duration::from_secs(60));
        assert_eq!(provider.max_tokens, 1024);
    }

    #[test]
    fn ollama_requires_model() {
        let settings = ProviderSettings {
            provider_type: "ollama".to_string(),
            ..Default::default()
        };
        assert!(settings.to_provider_config().is_err());
    }

    #[test]
    fn base_url_override_follows_openai_type() {
        let provider = ProviderSettings::openai("gpt-4o-mini")
            .with_base_url("http://localhost:8080/v1")
            .to_provider_config()
            .unwrap();
        assert_eq!(
            provider.provider_type,
            ProviderType::openai_compatible("http://localhost:8080/v1")
        );
    }

    #[test]
    fn unknown_provider_type_rejected() {
        let settings = ProviderSettings {
            provider_type: "anthropic".to_string(),
            ..Default::default()
        };
        let err = settings.to_provider_config().unwrap_err();
        assert!(err.to_string().contains("provider.type"));
    }

    #[test]
    fn resolve_api_key_prefers_named_env() {
        std::env::set_var("SANDBOX_AGENT_TEST_KEY", "from-env");
        let settings = ProviderSettings {
            provider_type: "ollama".to_string(),
            api_key_env: Some("SANDBOX_AGENT_TEST_KEY".to_string()),
            api_key: Some("direct".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key(), "from-env");
        std::env::remove_var("SANDBOX_AGENT_TEST_KEY");
    }

    #[test]
    fn resolve_api_key_falls_back_to_direct() {
        let settings = ProviderSettings::ollama("llama3.2").with_api_key("direct");
        assert_eq!(settings.resolve_api_key(), "direct");
    }

    #[test]
    fn from_toml_string() {
        let toml_str = r#"
working_dir = "./calculator"
max_iterations = 10

[provider]
type = "openai"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"

[sandbox]
script_extension = "py"
interpreter = "python3"
timeout_secs = 15

[logging]
enabled = false
level = "debug"
        "#;

        let settings: AgentSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.working_dir, Some(PathBuf::from("./calculator")));
        assert_eq!(settings.max_iterations, Some(10));
        assert_eq!(settings.provider.provider_type, "openai");
        assert_eq!(settings.sandbox.timeout_secs, 15);
        assert_eq!(settings.sandbox.max_read_chars, 10_000);
        assert!(!settings.logging.enabled);
        assert_eq!(settings.logging.level, LogLevel::Debug);
    }
}

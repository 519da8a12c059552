//! Configuration management for sandbox-agent.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./sandbox-agent.toml` (project-local)
//! 2. `~/.config/sandbox-agent/config.toml` (XDG config)
//!
//! A missing file means defaults everywhere.
//!
//! # Example Configuration
//!
//! ```toml
//! working_dir = "./calculator"
//! max_iterations = 20
//!
//! [provider]
//! type = "gemini"
//! model = "gemini-2.0-flash-001"
//! api_key_env = "GEMINI_API_KEY"
//!
//! [sandbox]
//! script_extension = "py"
//! interpreter = "python3"
//! timeout_secs = 30
//! max_read_chars = 10000
//!
//! [logging]
//! enabled = true
//! level = "info"
//! ```

mod file;
mod types;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};
pub use types::{AgentSettings, ProviderSettings, SandboxSettings};

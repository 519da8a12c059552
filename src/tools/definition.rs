//! Tool identities and typed arguments.
//!
//! The oracle's function-calling protocol hands over an arbitrary JSON object
//! per call. It is decoded exactly once, at dispatch time, into a
//! `ToolInvocation`: one variant per tool, each carrying a typed argument
//! struct. Anything that does not fit becomes a single `InvalidArguments`
//! error.

use crate::tools::error::ToolError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// The four sandboxed primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// List the immediate children of a directory
    ListDirectory,
    /// Read a text file, truncated at a character cap
    ReadFile,
    /// Create or overwrite a text file
    WriteFile,
    /// Run a script through the configured interpreter
    ExecuteScript,
}

impl ToolKind {
    /// Every tool, in manifest order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::ListDirectory,
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::ExecuteScript,
    ];

    /// Returns the name the oracle uses for this tool.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ListDirectory => "list_directory",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::ExecuteScript => "execute_script",
        }
    }

    /// Looks a tool up by its oracle-facing name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_directory() -> String {
    ".".to_string()
}

/// Arguments for `list_directory`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListDirectoryArgs {
    /// Directory to list, relative to the working directory
    #[serde(default = "default_directory")]
    pub directory: String,
}

/// Arguments for `read_file`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadFileArgs {
    /// File to read, relative to the working directory
    pub file_path: String,
}

/// Arguments for `write_file`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteFileArgs {
    /// File to write, relative to the working directory
    pub file_path: String,
    /// Full new content of the file
    pub content: String,
}

/// Arguments for `execute_script`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecuteScriptArgs {
    /// Script to run, relative to the working directory
    pub file_path: String,
    /// Extra command-line arguments passed to the script
    #[serde(default)]
    pub args: Vec<String>,
}

/// A decoded tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// `list_directory`
    ListDirectory(ListDirectoryArgs),
    /// `read_file`
    ReadFile(ReadFileArgs),
    /// `write_file`
    WriteFile(WriteFileArgs),
    /// `execute_script`
    ExecuteScript(ExecuteScriptArgs),
}

impl ToolInvocation {
    /// Decodes raw oracle arguments for the given tool.
    ///
    /// `null` counts as an empty object. Unknown extra fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` if the value is not an object, a required
    /// field is missing, or a field has the wrong type.
    pub fn decode(kind: ToolKind, arguments: &Value) -> Result<Self, ToolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(serde_json::Map::new()),
            Value::Object(_) => arguments.clone(),
            other => {
                return Err(ToolError::invalid_arguments(
                    kind.name(),
                    format!("expected a JSON object, got {other}"),
                ))
            }
        };

        let invalid = |e: serde_json::Error| ToolError::invalid_arguments(kind.name(), e.to_string());

        Ok(match kind {
            ToolKind::ListDirectory => {
                Self::ListDirectory(serde_json::from_value(arguments).map_err(invalid)?)
            }
            ToolKind::ReadFile => Self::ReadFile(serde_json::from_value(arguments).map_err(invalid)?),
            ToolKind::WriteFile => {
                Self::WriteFile(serde_json::from_value(arguments).map_err(invalid)?)
            }
            ToolKind::ExecuteScript => {
                Self::ExecuteScript(serde_json::from_value(arguments).map_err(invalid)?)
            }
        })
    }

    /// Returns which tool this invocation targets.
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::ListDirectory(_) => ToolKind::ListDirectory,
            Self::ReadFile(_) => ToolKind::ReadFile,
            Self::WriteFile(_) => ToolKind::WriteFile,
            Self::ExecuteScript(_) => ToolKind::ExecuteScript,
        }
    }
}

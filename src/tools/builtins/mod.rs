//! Built-in sandboxed tools.
//!
//! ## Available Tools
//!
//! ### Filesystem Tools
//! - **list_directory**: List a directory's immediate children with sizes
//! - **read_file**: Read UTF-8 text, truncated at 10,000 characters
//! - **write_file**: Create or overwrite a file, creating parent directories
//!
//! ### Execution Tools
//! - **execute_script**: Run a script through the configured interpreter
//!
//! Every tool takes the [`PathGuard`] from its caller; the oracle never
//! chooses the root.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sandbox_agent::tools::builtins::BuiltinTools;
//!
//! // All four tools
//! let tools = BuiltinTools::all();
//!
//! // Read-only subset
//! let tools = BuiltinTools::select(&["list_directory", "read_file"])?;
//! ```

mod execute_script;
mod list_directory;
mod read_file;
mod write_file;

pub use execute_script::{ExecuteScriptTool, ScriptPolicy, DEFAULT_SCRIPT_TIMEOUT};
pub use list_directory::ListDirectoryTool;
pub use read_file::{ReadFileTool, MAX_READ_CHARS};
pub use write_file::WriteFileTool;

use crate::messages::ToolDefinition;
use crate::tools::definition::{ToolInvocation, ToolKind};
use crate::tools::security::PathGuard;
use crate::tools::ToolError;

/// The set of enabled built-in tools and their executors.
#[derive(Debug, Clone)]
pub struct BuiltinTools {
    /// Enabled tools, in registration order
    enabled: Vec<ToolKind>,
    list_directory: ListDirectoryTool,
    read_file: ReadFileTool,
    write_file: WriteFileTool,
    execute_script: ExecuteScriptTool,
}

impl Default for BuiltinTools {
    fn default() -> Self {
        Self::all()
    }
}

impl BuiltinTools {
    /// Creates a set with all built-in tools.
    #[must_use]
    pub fn all() -> Self {
        Self::with_kinds(ToolKind::ALL.to_vec())
    }

    /// Creates a set with only the named tools, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` for a name that is not a built-in tool.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let tools = BuiltinTools::select(&["read_file", "write_file"])?;
    /// ```
    pub fn select(tools: &[&str]) -> Result<Self, ToolError> {
        let mut kinds = Vec::with_capacity(tools.len());
        for name in tools {
            let kind = ToolKind::from_name(name).ok_or_else(|| ToolError::unknown_tool(*name))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(Self::with_kinds(kinds))
    }

    fn with_kinds(enabled: Vec<ToolKind>) -> Self {
        Self {
            enabled,
            list_directory: ListDirectoryTool::new(),
            read_file: ReadFileTool::new(),
            write_file: WriteFileTool::new(),
            execute_script: ExecuteScriptTool::new(),
        }
    }

    /// Lists all available built-in tool names.
    #[must_use]
    pub fn available() -> Vec<&'static str> {
        ToolKind::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Sets the character cap for `read_file`.
    #[must_use]
    pub fn with_read_limit(mut self, max_chars: usize) -> Self {
        self.read_file = ReadFileTool::with_max_chars(max_chars);
        self
    }

    /// Sets the execution policy for `execute_script`.
    #[must_use]
    pub fn with_script_policy(mut self, policy: ScriptPolicy) -> Self {
        self.execute_script = ExecuteScriptTool::with_policy(policy);
        self
    }

    /// Returns the enabled tool matching `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ToolKind> {
        ToolKind::from_name(name).filter(|kind| self.enabled.contains(kind))
    }

    /// Returns the definitions of the enabled tools, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.enabled.iter().map(|kind| self.definition(*kind)).collect()
    }

    /// Returns the definition of a single tool.
    #[must_use]
    pub fn definition(&self, kind: ToolKind) -> ToolDefinition {
        match kind {
            ToolKind::ListDirectory => ListDirectoryTool::definition(),
            ToolKind::ReadFile => self.read_file.definition(),
            ToolKind::WriteFile => WriteFileTool::definition(),
            ToolKind::ExecuteScript => self.execute_script.definition(),
        }
    }

    /// Returns the number of enabled tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Returns true if no tools are enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Runs a decoded invocation against `guard`.
    ///
    /// # Errors
    ///
    /// Propagates the tool's own failure.
    pub async fn run(&self, guard: &PathGuard, invocation: ToolInvocation) -> Result<String, ToolError> {
        match invocation {
            ToolInvocation::ListDirectory(args) => self.list_directory.execute(guard, args).await,
            ToolInvocation::ReadFile(args) => self.read_file.execute(guard, args).await,
            ToolInvocation::WriteFile(args) => self.write_file.execute(guard, args).await,
            ToolInvocation::ExecuteScript(args) => self.execute_script.execute(guard, args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tools_all_creates_all_tools() {
        let tools = BuiltinTools::all();
        assert_eq!(tools.len(), 4);

        for name in BuiltinTools::available() {
            assert!(tools.get(name).is_some(), "missing tool {name}");
        }
    }

    #[test]
    fn builtin_tools_select_specific() {
        let tools = BuiltinTools::select(&["read_file", "list_directory"]).unwrap();
        assert_eq!(tools.len(), 2);

        assert!(tools.get("read_file").is_some());
        assert!(tools.get("list_directory").is_some());
        assert!(tools.get("execute_script").is_none());

        let names: Vec<_> = tools.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["read_file", "list_directory"]);
    }

    #[test]
    fn builtin_tools_select_unknown_fails() {
        let err = BuiltinTools::select(&["read_file", "bash"]).unwrap_err();
        assert!(err.is_unknown_tool());
    }

    #[test]
    fn builtin_tools_select_deduplicates() {
        let tools = BuiltinTools::select(&["read_file", "read_file"]).unwrap();
        assert_eq!(tools.len(), 1);
    }

    #[test]
    fn builtin_tools_empty_selection() {
        let tools = BuiltinTools::select(&[]).unwrap();
        assert!(tools.is_empty());
        assert!(tools.definitions().is_empty());
    }

    #[test]
    fn definitions_have_unique_names() {
        let mut names: Vec<_> = BuiltinTools::all()
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        let original_len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), original_len, "duplicate tool names found");
    }

    #[test]
    fn definitions_are_well_formed() {
        for definition in BuiltinTools::all().definitions() {
            let name = &definition.name;
            assert!(!definition.description.is_empty(), "tool {name} has empty description");
            assert_eq!(definition.input_schema["type"], "object", "tool {name} schema type");
            assert!(
                definition.input_schema["properties"].get("root").is_none(),
                "tool {name} exposes root"
            );
        }
    }

    #[test]
    fn definition_names_match_kinds() {
        let tools = BuiltinTools::all();
        for kind in ToolKind::ALL {
            assert_eq!(tools.definition(kind).name, kind.name());
        }
    }

    #[test]
    fn definitions_reflect_configured_limits() {
        let tools = BuiltinTools::all()
            .with_read_limit(500)
            .with_script_policy(ScriptPolicy::new("rb", "ruby"));
        let definitions = tools.definitions();

        let read = definitions.iter().find(|d| d.name == "read_file").unwrap();
        assert!(read.description.contains("truncated at 500 characters"));
        let exec = definitions.iter().find(|d| d.name == "execute_script").unwrap();
        assert!(exec.description.contains(".rb file with ruby"));
    }
}

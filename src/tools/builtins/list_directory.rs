//! List directory built-in tool.
//!
//! Lists the immediate children of a directory inside the working root.

use crate::messages::ToolDefinition;
use crate::tools::definition::ListDirectoryArgs;
use crate::tools::security::PathGuard;
use crate::tools::ToolError;
use serde_json::json;

/// List directory tool executor.
///
/// Emits one line per entry with its size and whether it is a directory.
/// Entries come back in the platform's enumeration order.
#[derive(Debug, Default, Clone)]
pub struct ListDirectoryTool;

impl ListDirectoryTool {
    /// Creates a new list directory tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the tool definition exposed to the oracle.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: "list_directory".to_string(),
            description: "Lists files in the specified directory along with their sizes, constrained to the working directory.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "directory": {
                        "type": "string",
                        "description": "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself."
                    }
                }
            }),
        }
    }

    /// Lists the directory named by `args`.
    ///
    /// # Errors
    ///
    /// Fails with `Containment` if the path escapes the root, `NotADirectory`
    /// if it does not name a directory, and `Io` if enumeration fails.
    pub async fn execute(
        &self,
        guard: &PathGuard,
        args: ListDirectoryArgs,
    ) -> Result<String, ToolError> {
        let resolved = guard.resolve(&args.directory)?;
        let path = resolved.as_path();

        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Err(ToolError::not_a_directory(&args.directory)),
        }

        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| ToolError::io(&args.directory, e.to_string()))?;

        let mut lines = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| ToolError::io(&args.directory, e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Symlinks are described by the link itself, never by their target.
            let metadata = tokio::fs::symlink_metadata(entry.path())
                .await
                .map_err(|e| ToolError::io(&args.directory, format!("{name}: {e}")))?;

            lines.push(format!(
                "- {}: file_size={} bytes, is_dir={}",
                name,
                metadata.len(),
                metadata.is_dir()
            ));
        }

        tracing::debug!(directory = %args.directory, entries = lines.len(), "Listed directory");
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(directory: &str) -> ListDirectoryArgs {
        ListDirectoryArgs {
            directory: directory.to_string(),
        }
    }

    #[tokio::test]
    async fn list_directory_reports_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("hello.txt"), "hello").unwrap();
        std::fs::create_dir(temp_dir.path().join("pkg")).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ListDirectoryTool::new().execute(&guard, args(".")).await.unwrap();

        let mut lines: Vec<&str> = output.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "- hello.txt: file_size=5 bytes, is_dir=false");
        assert!(lines[1].starts_with("- pkg: file_size="));
        assert!(lines[1].ends_with("is_dir=true"));
    }

    #[tokio::test]
    async fn list_directory_empty_is_empty_text() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("empty")).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ListDirectoryTool::new()
            .execute(&guard, args("empty"))
            .await
            .unwrap();

        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn list_directory_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
        std::fs::write(temp_dir.path().join("a/b/deep.txt"), "x").unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ListDirectoryTool::new().execute(&guard, args("a")).await.unwrap();

        assert_eq!(output.lines().count(), 1);
        assert!(!output.contains("deep.txt"));
    }

    #[tokio::test]
    async fn list_directory_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("main.py"), "print(1)").unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ListDirectoryTool::new()
            .execute(&guard, args("main.py"))
            .await
            .unwrap_err();

        assert_eq!(err, ToolError::not_a_directory("main.py"));
    }

    #[tokio::test]
    async fn list_directory_rejects_missing() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ListDirectoryTool::new()
            .execute(&guard, args("nope"))
            .await
            .unwrap_err();

        assert_eq!(err, ToolError::not_a_directory("nope"));
    }

    #[tokio::test]
    async fn list_directory_rejects_escape() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ListDirectoryTool::new()
            .execute(&guard, args("../"))
            .await
            .unwrap_err();

        assert!(err.is_containment());
    }

    #[test]
    fn definition_has_optional_directory() {
        let definition = ListDirectoryTool::definition();
        assert_eq!(definition.name, "list_directory");
        assert!(definition.input_schema["properties"]["directory"].is_object());
        assert!(definition.input_schema.get("required").is_none());
    }
}

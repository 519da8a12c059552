//! Write file built-in tool.
//!
//! Creates or overwrites a file inside the working root.

use crate::messages::ToolDefinition;
use crate::tools::definition::WriteFileArgs;
use crate::tools::security::PathGuard;
use crate::tools::ToolError;
use serde_json::json;

/// Write file tool executor.
///
/// Missing parent directories are created. Existing content is replaced.
#[derive(Debug, Default, Clone)]
pub struct WriteFileTool;

impl WriteFileTool {
    /// Creates a new write file tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the tool definition exposed to the oracle.
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: "write_file".to_string(),
            description: "Writes content to a file within the working directory. Creates the file and any missing parent directories if they don't exist, and overwrites existing content.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the file to write, relative to the working directory."
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to write to the file."
                    }
                },
                "required": ["file_path", "content"]
            }),
        }
    }

    /// Writes the file named by `args`.
    ///
    /// # Errors
    ///
    /// Fails with `Containment` if the path escapes the root and `Io` if the
    /// parent directories or the file cannot be written.
    pub async fn execute(&self, guard: &PathGuard, args: WriteFileArgs) -> Result<String, ToolError> {
        let resolved = guard.resolve(&args.file_path)?;
        let path = resolved.as_path();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io(&args.file_path, format!("failed to create parent directories: {e}")))?;
        }

        tokio::fs::write(path, args.content.as_bytes())
            .await
            .map_err(|e| ToolError::io(&args.file_path, e.to_string()))?;

        let written = args.content.chars().count();
        tracing::debug!(file_path = %args.file_path, chars = written, "Wrote file");

        Ok(format!(
            "Successfully wrote to \"{}\" ({} characters written)",
            args.file_path, written
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(file_path: &str, content: &str) -> WriteFileArgs {
        WriteFileArgs {
            file_path: file_path.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn write_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = WriteFileTool::new()
            .execute(&guard, args("sub/new.txt", "hello"))
            .await
            .unwrap();

        assert_eq!(output, "Successfully wrote to \"sub/new.txt\" (5 characters written)");
        assert!(temp_dir.path().join("sub").is_dir());
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("sub/new.txt")).unwrap(),
            "hello"
        );
    }

    #[tokio::test]
    async fn write_file_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "a much longer original").unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        WriteFileTool::new()
            .execute(&guard, args("notes.txt", "short"))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("notes.txt")).unwrap(),
            "short"
        );
    }

    #[tokio::test]
    async fn write_file_counts_characters() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = WriteFileTool::new()
            .execute(&guard, args("accents.txt", "héllo"))
            .await
            .unwrap();

        assert!(output.ends_with("(5 characters written)"));
    }

    #[tokio::test]
    async fn write_file_rejects_parent_escape() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        std::fs::create_dir(&root).unwrap();
        let guard = PathGuard::new(&root).unwrap();

        let err = WriteFileTool::new()
            .execute(&guard, args("../escaped.txt", "nope"))
            .await
            .unwrap_err();

        assert!(err.is_containment());
        assert!(!temp_dir.path().join("escaped.txt").exists());
    }

    #[tokio::test]
    async fn write_file_onto_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("pkg")).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = WriteFileTool::new()
            .execute(&guard, args("pkg", "data"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), crate::tools::ToolErrorKind::Io { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_file_refuses_symlink_out_of_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
        let guard = PathGuard::new(&root).unwrap();

        let err = WriteFileTool::new()
            .execute(&guard, args("link/pwned.txt", "x"))
            .await
            .unwrap_err();

        assert!(err.is_containment());
        assert!(!outside.join("pwned.txt").exists());
    }
}

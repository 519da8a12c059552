//! Read file built-in tool.
//!
//! Reads UTF-8 text from a file inside the working root, truncated at a
//! character cap.

use crate::messages::ToolDefinition;
use crate::tools::definition::ReadFileArgs;
use crate::tools::security::PathGuard;
use crate::tools::ToolError;
use serde_json::json;
use tokio::io::AsyncReadExt;

/// Default character cap for file reads.
pub const MAX_READ_CHARS: usize = 10_000;

/// Read file tool executor.
#[derive(Debug, Clone)]
pub struct ReadFileTool {
    /// Maximum number of characters returned before truncation
    max_chars: usize,
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self {
            max_chars: MAX_READ_CHARS,
        }
    }
}

impl ReadFileTool {
    /// Creates a new read file tool with the default cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a read file tool with a custom character cap.
    #[must_use]
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Returns the tool definition exposed to the oracle.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_file".to_string(),
            description: format!(
                "Reads the content of a specified file, truncated at {} characters, constrained to the working directory.",
                self.max_chars
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "The file path to read from, relative to the working directory."
                    }
                },
                "required": ["file_path"]
            }),
        }
    }

    /// Reads the file named by `args`.
    ///
    /// # Errors
    ///
    /// Fails with `Containment`, `NotFound` for anything but a regular file,
    /// `DecodeError` for invalid UTF-8, and `Io` for read failures.
    pub async fn execute(&self, guard: &PathGuard, args: ReadFileArgs) -> Result<String, ToolError> {
        let resolved = guard.resolve(&args.file_path)?;

        match tokio::fs::metadata(resolved.as_path()).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(ToolError::not_found(&args.file_path)),
        }

        let file = tokio::fs::File::open(resolved.as_path())
            .await
            .map_err(|e| ToolError::io(&args.file_path, e.to_string()))?;

        // A char is at most 4 bytes, so this is enough to see cap + 1 chars.
        let byte_limit = (self.max_chars as u64).saturating_add(1).saturating_mul(4);
        let mut buf = Vec::new();
        file.take(byte_limit)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| ToolError::io(&args.file_path, e.to_string()))?;
        let hit_limit = buf.len() as u64 == byte_limit;

        let text = match std::str::from_utf8(&buf) {
            Ok(text) => text,
            Err(err) => {
                let valid = std::str::from_utf8(&buf[..err.valid_up_to()])
                    .map_err(|e| ToolError::decode(&args.file_path, e.to_string()))?;
                // Bytes past the cap, or a character split by the byte cut,
                // never reach the output.
                let past_cap = valid.chars().nth(self.max_chars).is_some();
                let split_tail = hit_limit && err.error_len().is_none();
                if !(past_cap || split_tail) {
                    return Err(ToolError::decode(&args.file_path, err.to_string()));
                }
                valid
            }
        };

        match text.char_indices().nth(self.max_chars) {
            Some((cut, _)) => {
                tracing::debug!(file_path = %args.file_path, max_chars = self.max_chars, "Truncated file read");
                Ok(format!(
                    "{}[...File \"{}\" truncated at {} characters]",
                    &text[..cut],
                    args.file_path,
                    self.max_chars
                ))
            }
            None => Ok(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(file_path: &str) -> ReadFileArgs {
        ReadFileArgs {
            file_path: file_path.to_string(),
        }
    }

    #[tokio::test]
    async fn read_file_basic() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("main.py"), "print('hi')\n").unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::new().execute(&guard, args("main.py")).await.unwrap();

        assert_eq!(output, "print('hi')\n");
    }

    #[tokio::test]
    async fn read_file_exactly_at_cap_is_not_truncated() {
        let temp_dir = TempDir::new().unwrap();
        let content = "a".repeat(MAX_READ_CHARS);
        std::fs::write(temp_dir.path().join("full.txt"), &content).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::new().execute(&guard, args("full.txt")).await.unwrap();

        assert_eq!(output, content);
    }

    #[tokio::test]
    async fn read_file_truncates_one_past_cap() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("pkg")).unwrap();
        std::fs::write(
            temp_dir.path().join("pkg/long.txt"),
            "b".repeat(MAX_READ_CHARS + 1),
        )
        .unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::new()
            .execute(&guard, args("pkg/long.txt"))
            .await
            .unwrap();

        let marker = "[...File \"pkg/long.txt\" truncated at 10000 characters]";
        assert!(output.ends_with(marker));
        let body = &output[..output.len() - marker.len()];
        assert_eq!(body.chars().count(), MAX_READ_CHARS);
        assert!(body.chars().all(|c| c == 'b'));
    }

    #[tokio::test]
    async fn read_file_ignores_invalid_bytes_past_cap() {
        let temp_dir = TempDir::new().unwrap();
        let mut content = "a".repeat(MAX_READ_CHARS + 1).into_bytes();
        content.extend_from_slice(&[0xff, 0xfe]);
        std::fs::write(temp_dir.path().join("log.txt"), content).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::new().execute(&guard, args("log.txt")).await.unwrap();

        assert_eq!(
            output,
            format!(
                "{}[...File \"log.txt\" truncated at 10000 characters]",
                "a".repeat(MAX_READ_CHARS)
            )
        );
    }

    #[tokio::test]
    async fn read_file_rejects_invalid_bytes_within_cap() {
        let temp_dir = TempDir::new().unwrap();
        let mut content = "a".repeat(5).into_bytes();
        content.push(0xff);
        content.extend_from_slice("a".repeat(20).as_bytes());
        std::fs::write(temp_dir.path().join("mixed.txt"), content).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ReadFileTool::with_max_chars(10)
            .execute(&guard, args("mixed.txt"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind(),
            crate::tools::ToolErrorKind::DecodeError { .. }
        ));
    }

    #[tokio::test]
    async fn read_file_huge_cap_does_not_overflow() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("tiny.txt"), "ok").unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::with_max_chars(5_000_000_000_000_000_000)
            .execute(&guard, args("tiny.txt"))
            .await
            .unwrap();

        assert_eq!(output, "ok");
    }

    #[tokio::test]
    async fn read_file_counts_characters_not_bytes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("wide.txt"), "é".repeat(12)).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::with_max_chars(10)
            .execute(&guard, args("wide.txt"))
            .await
            .unwrap();

        assert!(output.starts_with(&"é".repeat(10)));
        assert!(output.ends_with("truncated at 10 characters]"));
    }

    #[tokio::test]
    async fn read_file_tolerates_split_multibyte_at_byte_limit() {
        let temp_dir = TempDir::new().unwrap();
        // The 16-byte read window ends one byte into the sixth character.
        std::fs::write(temp_dir.path().join("cjk.txt"), "漢".repeat(20)).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let output = ReadFileTool::with_max_chars(3)
            .execute(&guard, args("cjk.txt"))
            .await
            .unwrap();

        assert_eq!(output, "漢漢漢[...File \"cjk.txt\" truncated at 3 characters]");
    }

    #[tokio::test]
    async fn read_file_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bin.dat"), [0x66, 0xff, 0xfe, 0x00]).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ReadFileTool::new()
            .execute(&guard, args("bin.dat"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.kind(),
            crate::tools::ToolErrorKind::DecodeError { path, .. } if path == "bin.dat"
        ));
    }

    #[tokio::test]
    async fn read_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ReadFileTool::new()
            .execute(&guard, args("missing.txt"))
            .await
            .unwrap_err();

        assert_eq!(err, ToolError::not_found("missing.txt"));
    }

    #[tokio::test]
    async fn read_file_directory_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("pkg")).unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ReadFileTool::new().execute(&guard, args("pkg")).await.unwrap_err();

        assert_eq!(err, ToolError::not_found("pkg"));
    }

    #[tokio::test]
    async fn read_file_rejects_absolute_escape() {
        let temp_dir = TempDir::new().unwrap();
        let guard = PathGuard::new(temp_dir.path()).unwrap();

        let err = ReadFileTool::new()
            .execute(&guard, args("/etc/passwd"))
            .await
            .unwrap_err();

        assert!(err.is_containment());
    }

    #[test]
    fn definition_requires_file_path() {
        let definition = ReadFileTool::new().definition();
        assert_eq!(definition.name, "read_file");
        assert_eq!(definition.input_schema["required"], json!(["file_path"]));
        assert!(definition.description.contains("truncated at 10000 characters"));

        let capped = ReadFileTool::with_max_chars(250).definition();
        assert!(capped.description.contains("truncated at 250 characters"));
    }
}

//! Tool error types.
//!
//! Every failure a tool primitive or the registry can produce. None of these
//! abort the agent loop: they are rendered to text and handed back to the
//! oracle so it can correct itself.

use crate::tools::security::{ContainmentError, ContainmentErrorKind};
use std::fmt;
use std::time::Duration;

/// Errors that can occur in tool operations.
///
/// Boxes the kind to keep `Result<String, ToolError>` small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    kind: Box<ToolErrorKind>,
}

/// Specific tool error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The path escapes the working directory or cannot be resolved inside it
    Containment {
        /// The underlying containment failure
        error: ContainmentError,
    },
    /// The target does not exist or is not a regular file
    NotFound {
        /// The caller-supplied path
        path: String,
    },
    /// The target is not a directory
    NotADirectory {
        /// The caller-supplied path
        path: String,
    },
    /// The target is not something this tool may operate on
    InvalidTarget {
        /// The caller-supplied path
        path: String,
        /// Why it was refused
        reason: String,
    },
    /// The file content is not valid UTF-8
    DecodeError {
        /// The caller-supplied path
        path: String,
        /// Decoder message
        reason: String,
    },
    /// A filesystem operation failed
    Io {
        /// The caller-supplied path
        path: String,
        /// The underlying I/O message
        message: String,
    },
    /// The interpreter could not be spawned or waited on
    ExecError {
        /// The caller-supplied path
        path: String,
        /// Reason for failure
        reason: String,
    },
    /// The subprocess exceeded its wall-clock limit and was killed
    Timeout {
        /// The caller-supplied path
        path: String,
        /// The limit that was exceeded
        duration: Duration,
    },
    /// No tool with this name is registered
    UnknownTool {
        /// The requested name
        tool_name: String,
    },
    /// The arguments do not match the tool's parameter schema
    InvalidArguments {
        /// The tool name
        tool_name: String,
        /// What was invalid
        reason: String,
    },
}

impl ToolError {
    /// Creates a new ToolError with the given kind.
    #[must_use]
    pub fn new(kind: ToolErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound { path: path.into() })
    }

    /// Creates a not-a-directory error.
    #[must_use]
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotADirectory { path: path.into() })
    }

    /// Creates an invalid target error.
    #[must_use]
    pub fn invalid_target(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidTarget {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::DecodeError {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Io {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates an exec error.
    #[must_use]
    pub fn exec(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::ExecError {
            path: path.into(),
            reason: reason.into(),
        })
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(path: impl Into<String>, duration: Duration) -> Self {
        Self::new(ToolErrorKind::Timeout {
            path: path.into(),
            duration,
        })
    }

    /// Creates an unknown tool error.
    #[must_use]
    pub fn unknown_tool(tool_name: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::UnknownTool {
            tool_name: tool_name.into(),
        })
    }

    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments {
            tool_name: tool_name.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the path was rejected by the containment check.
    #[must_use]
    pub fn is_containment(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::Containment { .. })
    }

    /// Returns true if the requested tool does not exist.
    #[must_use]
    pub fn is_unknown_tool(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::UnknownTool { .. })
    }

    /// Returns true if the subprocess timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::Timeout { .. })
    }

    /// Renders the error as the text the oracle sees.
    #[must_use]
    pub fn to_tool_text(&self) -> String {
        format!("Error: {self}")
    }
}

impl From<ContainmentError> for ToolError {
    fn from(error: ContainmentError) -> Self {
        Self::new(ToolErrorKind::Containment { error })
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            ToolErrorKind::Containment { error } => match error.kind {
                ContainmentErrorKind::OutsideRoot { .. } => write!(
                    f,
                    "{}; use a path relative to the working directory",
                    error
                ),
                ContainmentErrorKind::Unresolvable { .. } => write!(f, "{}", error),
            },
            ToolErrorKind::NotFound { path } => {
                write!(f, "file not found or is not a regular file: \"{}\"", path)
            }
            ToolErrorKind::NotADirectory { path } => {
                write!(f, "\"{}\" is not a directory", path)
            }
            ToolErrorKind::InvalidTarget { path, reason } => {
                write!(f, "\"{}\" cannot be executed: {}", path, reason)
            }
            ToolErrorKind::DecodeError { path, reason } => {
                write!(f, "\"{}\" is not valid UTF-8 text: {}", path, reason)
            }
            ToolErrorKind::Io { path, message } => {
                write!(f, "I/O failure on \"{}\": {}", path, message)
            }
            ToolErrorKind::ExecError { path, reason } => {
                write!(f, "executing \"{}\" failed: {}", path, reason)
            }
            ToolErrorKind::Timeout { path, duration } => {
                write!(
                    f,
                    "\"{}\" timed out after {:?} and was killed",
                    path, duration
                )
            }
            ToolErrorKind::UnknownTool { tool_name } => {
                write!(f, "unknown tool '{}'", tool_name)
            }
            ToolErrorKind::InvalidArguments { tool_name, reason } => {
                write!(
                    f,
                    "invalid arguments for '{}': {}; check the parameter schema",
                    tool_name, reason
                )
            }
        }
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn containment_error_display() {
        let error: ToolError =
            ContainmentError::outside_root("/etc/passwd", PathBuf::from("/etc/passwd")).into();
        let message = error.to_string();
        assert!(error.is_containment());
        assert!(message.contains("/etc/passwd"));
        assert!(message.contains("outside the permitted working directory"));
    }

    #[test]
    fn not_found_display() {
        let message = ToolError::not_found("pkg/missing.py").to_string();
        assert!(message.contains("pkg/missing.py"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn not_a_directory_display() {
        let message = ToolError::not_a_directory("main.py").to_string();
        assert_eq!(message, "\"main.py\" is not a directory");
    }

    #[test]
    fn timeout_display() {
        let error = ToolError::timeout("slow.py", Duration::from_secs(30));
        assert!(error.is_timeout());
        assert!(error.to_string().contains("timed out after 30s"));
    }

    #[test]
    fn timeout_display_keeps_sub_second_limits() {
        let error = ToolError::timeout("slow.sh", Duration::from_millis(300));
        assert_eq!(
            error.to_string(),
            "\"slow.sh\" timed out after 300ms and was killed"
        );
    }

    #[test]
    fn unknown_tool_display() {
        let error = ToolError::unknown_tool("delete_everything");
        assert!(error.is_unknown_tool());
        assert!(error.to_string().contains("delete_everything"));
    }

    #[test]
    fn invalid_arguments_display() {
        let message = ToolError::invalid_arguments("read_file", "missing field `file_path`")
            .to_string();
        assert!(message.contains("read_file"));
        assert!(message.contains("file_path"));
    }

    #[test]
    fn tool_text_is_prefixed() {
        let text = ToolError::io("a.txt", "disk full").to_tool_text();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn errors_are_clone_and_eq() {
        let error1 = ToolError::exec("run.py", "No such file or directory");
        let error2 = error1.clone();
        assert_eq!(error1, error2);
        assert_ne!(error1, ToolError::not_found("run.py"));
    }

    #[test]
    fn kind_accessor() {
        let error = ToolError::decode("bin.dat", "invalid utf-8 sequence");
        assert!(matches!(error.kind(), ToolErrorKind::DecodeError { .. }));
    }
}

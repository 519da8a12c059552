//! Script execution built-in tool.
//!
//! Runs a script from the working root through a fixed interpreter with a
//! wall-clock timeout and separate stdout/stderr capture.

use crate::messages::ToolDefinition;
use crate::tools::definition::ExecuteScriptArgs;
use crate::tools::security::{ContainmentError, PathGuard, ResolvedPath};
use crate::tools::ToolError;
use serde_json::json;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// Default wall-clock limit for a script run.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which files may be executed and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPolicy {
    /// Required file extension, without the dot
    pub extension: String,
    /// Interpreter program, looked up on `PATH`
    pub interpreter: String,
    /// Wall-clock limit after which the process group is killed
    pub timeout: Duration,
}

impl Default for ScriptPolicy {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            interpreter: "python3".to_string(),
            timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }
}

impl ScriptPolicy {
    /// Creates a policy for the given extension and interpreter.
    #[must_use]
    pub fn new(extension: impl Into<String>, interpreter: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            interpreter: interpreter.into(),
            timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }

    /// Sets the wall-clock limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Script execution tool executor.
#[derive(Debug, Default, Clone)]
pub struct ExecuteScriptTool {
    policy: ScriptPolicy,
}

impl ExecuteScriptTool {
    /// Creates a script tool with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script tool with a custom policy.
    #[must_use]
    pub fn with_policy(policy: ScriptPolicy) -> Self {
        Self { policy }
    }

    /// Returns the tool definition exposed to the oracle.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "execute_script".to_string(),
            description: format!(
                "Executes a .{} file with {} within the working directory and returns its output, with optional command-line arguments. Runs are killed after {:?}.",
                self.policy.extension, self.policy.interpreter, self.policy.timeout
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the script to execute, relative to the working directory."
                    },
                    "args": {
                        "type": "array",
                        "items": {
                            "type": "string"
                        },
                        "description": "Optional command-line arguments passed to the script."
                    }
                },
                "required": ["file_path"]
            }),
        }
    }

    /// Runs the script named by `args`.
    ///
    /// # Errors
    ///
    /// Fails with `Containment`, `NotFound`, `InvalidTarget` for the wrong
    /// extension, `ExecError` if the interpreter cannot be spawned, and
    /// `Timeout` if the run exceeds the policy limit.
    pub async fn execute(
        &self,
        guard: &PathGuard,
        args: ExecuteScriptArgs,
    ) -> Result<String, ToolError> {
        let resolved = guard.resolve(&args.file_path)?;

        match tokio::fs::metadata(resolved.as_path()).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(ToolError::not_found(&args.file_path)),
        }

        let extension_matches = resolved
            .as_path()
            .extension()
            .is_some_and(|ext| ext == self.policy.extension.as_str());
        if !extension_matches {
            return Err(ToolError::invalid_target(
                &args.file_path,
                format!("only .{} files may be executed", self.policy.extension),
            ));
        }

        confirm_unchanged(guard, &args.file_path, &resolved)?;

        let mut cmd = Command::new(&self.policy.interpreter);
        cmd.arg(resolved.as_path())
            .args(&args.args)
            .current_dir(guard.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        tracing::debug!(
            interpreter = %self.policy.interpreter,
            file_path = %args.file_path,
            args = ?args.args,
            "Spawning script"
        );

        let mut child = cmd.spawn().map_err(|e| {
            ToolError::exec(
                &args.file_path,
                format!("failed to spawn '{}': {e}", self.policy.interpreter),
            )
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let result = timeout(self.policy.timeout, async {
            let (stdout_buf, stderr_buf) = tokio::join!(drain(stdout), drain(stderr));
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout_buf?, stderr_buf?))
        })
        .await;

        match result {
            Ok(Ok((status, stdout_buf, stderr_buf))) => {
                let stdout = String::from_utf8_lossy(&stdout_buf);
                let stderr = String::from_utf8_lossy(&stderr_buf);
                let exit_code = status.code().unwrap_or(-1);

                tracing::debug!(file_path = %args.file_path, exit_code, "Script finished");
                Ok(format_report(&stdout, &stderr, exit_code))
            }
            Ok(Err(e)) => Err(ToolError::exec(&args.file_path, format!("process error: {e}"))),
            Err(_) => {
                tracing::warn!(
                    file_path = %args.file_path,
                    timeout = ?self.policy.timeout,
                    "Script timed out, killing process group"
                );
                terminate(&mut child).await;
                Err(ToolError::timeout(&args.file_path, self.policy.timeout))
            }
        }
    }
}

/// Resolves `file_path` again and fails if it no longer lands on `resolved`.
///
/// Catches a symlink swapped in after the first containment check.
fn confirm_unchanged(
    guard: &PathGuard,
    file_path: &str,
    resolved: &ResolvedPath,
) -> Result<(), ToolError> {
    let recheck = guard.resolve(file_path)?;
    if &recheck != resolved {
        tracing::warn!(file_path = %file_path, "Script path changed before spawn");
        return Err(ContainmentError::unresolvable(
            file_path,
            "path changed between validation and execution",
        )
        .into());
    }
    Ok(())
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kills the child's whole process group, then reaps the child.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::debug!(pid, error = %e, "killpg failed");
        }
    }

    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "Failed to reap timed out script");
    }
}

fn format_report(stdout: &str, stderr: &str, exit_code: i32) -> String {
    let mut parts = Vec::new();
    if !stdout.is_empty() {
        parts.push(format!("STDOUT: {stdout}"));
    }
    if !stderr.is_empty() {
        parts.push(format!("STDERR: {stderr}"));
    }
    if exit_code != 0 {
        parts.push(format!("Process exited with code {exit_code}"));
    }

    let report = parts.join("\n");
    let report = report.trim();
    if report.is_empty() {
        "No output produced.".to_string()
    } else {
        report.to_string()
    }
}

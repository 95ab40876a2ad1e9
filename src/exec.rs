//! Blocking subprocess execution behind an injectable [`Executor`].
use std::fmt;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::Result;

use crate::error::CommandError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
///
/// Every external interaction (build tool, service manager, migration tool,
/// privilege probe) goes through this trait so orchestrators can be tested
/// without touching the real system. All calls block until the child exits.
pub trait Executor: Send + Sync + fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the program cannot be started and
    /// [`CommandError::Failed`] if it exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in `dir` with the child attached to this process's
    /// stdout and stderr, so long-running tool output reaches the operator
    /// as it is written. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::run`]; the failure carries no captured output.
    fn run_attached_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<()>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

/// Spawn the command and capture its output.
fn spawn(mut cmd: Command, label: &str) -> Result<ExecResult> {
    tracing::debug!("exec: {label}");
    let output = cmd.output().map_err(|source| CommandError::Spawn {
        label: label.to_string(),
        source,
    })?;
    let result = ExecResult::from(output);
    if !result.stdout.trim().is_empty() {
        tracing::debug!("{label} stdout: {}", result.stdout.trim_end());
    }
    if !result.stderr.trim().is_empty() {
        tracing::debug!("{label} stderr: {}", result.stderr.trim_end());
    }
    Ok(result)
}

/// Text carried by a failure: stderr, else stdout (MSBuild reports compile
/// errors on stdout).
fn failure_detail(result: &ExecResult) -> String {
    let stderr = result.stderr.trim();
    if stderr.is_empty() {
        result.stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(cmd: Command, label: &str) -> Result<ExecResult> {
    let result = spawn(cmd, label)?;
    if !result.success {
        return Err(CommandError::Failed {
            label: label.to_string(),
            code: result.code,
            detail: failure_detail(&result),
        }
        .into());
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program)
    }

    fn run_attached_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<()> {
        let label = format!("{program} in {}", dir.display());
        tracing::debug!("exec: {label}");
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CommandError::Spawn {
                label: label.clone(),
                source,
            })?;
        if !status.success() {
            return Err(CommandError::Failed {
                label,
                code: status.code(),
                detail: "see tool output above".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        spawn(cmd, program)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Shared test helpers for code that drives an [`Executor`].
#[cfg(test)]
pub mod test_helpers {
    use super::{ExecResult, Executor};
    use crate::error::CommandError;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// A single recorded executor call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        /// Working directory, when the call used `run_attached_in`.
        pub dir: Option<PathBuf>,
        /// Program followed by its arguments, space separated.
        pub command: String,
        /// Whether the call went through `run_attached_in`.
        pub attached: bool,
    }

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(success, stdout)` responses consumed in FIFO
    /// order. When the queue is empty every call succeeds with empty stdout.
    /// Checked calls that receive a failed response return
    /// [`CommandError::Failed`] with exit code 1.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        which_result: bool,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockExecutor {
        /// Create a mock where every call succeeds.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, &str)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(ok, out)| (ok, out.to_string()))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        /// Set the value returned by every [`Executor::which`] call.
        #[must_use]
        pub const fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        /// Commands issued so far, in order.
        #[must_use]
        pub fn commands(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .map(|call| call.command)
                .collect()
        }

        /// Full call records issued so far, in order.
        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn record(
            &self,
            dir: Option<&Path>,
            attached: bool,
            program: &str,
            args: &[&str],
        ) -> (bool, String) {
            let mut command = program.to_string();
            for arg in args {
                command.push(' ');
                command.push_str(arg);
            }
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(RecordedCall {
                    dir: dir.map(Path::to_path_buf),
                    command,
                    attached,
                });
            self.responses
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| (true, String::new()))
        }

        fn checked(
            &self,
            dir: Option<&Path>,
            attached: bool,
            program: &str,
            args: &[&str],
        ) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.record(dir, attached, program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                Err(CommandError::Failed {
                    label: program.to_string(),
                    code: Some(1),
                    detail: "mock command failed".to_string(),
                }
                .into())
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.checked(None, false, program, args)
        }

        fn run_attached_in(&self, dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<()> {
            self.checked(Some(dir), true, program, args).map(|_| ())
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.record(None, false, program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn which(&self, _: &str) -> bool {
            self.which_result
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: run a simple echo command cross-platform.
    fn echo_result(msg: &str) -> Result<ExecResult> {
        #[cfg(windows)]
        {
            SystemExecutor.run("cmd", &["/C", "echo", msg])
        }
        #[cfg(not(windows))]
        {
            SystemExecutor.run("echo", &[msg])
        }
    }

    #[test]
    fn run_echo() {
        let result = echo_result("hello").unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure_is_command_error() {
        #[cfg(windows)]
        let result = SystemExecutor.run("cmd", &["/C", "exit", "3"]);
        #[cfg(not(windows))]
        let result = SystemExecutor.run("sh", &["-c", "exit 3"]);
        let err = result.expect_err("non-zero exit should produce an error");
        let cmd_err = err
            .downcast_ref::<CommandError>()
            .expect("should be a CommandError");
        assert_eq!(cmd_err.exit_code(), 3);
    }

    #[cfg(not(windows))]
    #[test]
    fn run_failure_carries_stdout_when_stderr_is_empty() {
        let err = SystemExecutor
            .run(
                "sh",
                &["-c", "echo 'Program.cs(3,1): error CS1002: ; expected'; exit 1"],
            )
            .unwrap_err();
        assert!(
            err.to_string().contains("error CS1002"),
            "build diagnostics on stdout should reach the operator: {err}"
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn run_failure_prefers_stderr() {
        let err = SystemExecutor
            .run("sh", &["-c", "echo progress; echo broken >&2; exit 1"])
            .unwrap_err();
        assert!(err.to_string().ends_with(": broken"), "{err}");
    }

    #[test]
    fn run_attached_in_propagates_exit_code() {
        let dir = std::env::temp_dir();
        #[cfg(windows)]
        let result = SystemExecutor.run_attached_in(&dir, "cmd", &["/C", "exit", "4"]);
        #[cfg(not(windows))]
        let result = SystemExecutor.run_attached_in(&dir, "sh", &["-c", "exit 4"]);
        let err = result.expect_err("non-zero exit should produce an error");
        assert_eq!(err.downcast_ref::<CommandError>().unwrap().exit_code(), 4);
    }

    #[test]
    fn run_attached_in_success() {
        let dir = std::env::temp_dir();
        #[cfg(windows)]
        let result = SystemExecutor.run_attached_in(&dir, "cmd", &["/C", "exit", "0"]);
        #[cfg(not(windows))]
        let result = SystemExecutor.run_attached_in(&dir, "true", &[]);
        assert!(result.is_ok());
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let err = SystemExecutor
            .run("this-program-does-not-exist-12345", &[])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::Spawn { .. })
        ));
    }

    #[test]
    fn run_unchecked_failure() {
        #[cfg(windows)]
        let result = SystemExecutor.run_unchecked("cmd", &["/C", "exit", "1"]).unwrap();
        #[cfg(not(windows))]
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[test]
    fn mock_executor_records_calls_in_order() {
        let mock = test_helpers::MockExecutor::new();
        mock.run("dotnet", &["clean"]).unwrap();
        mock.run_attached_in(Path::new("/repo/Schema"), "dotnet", &["ef"]).unwrap();
        assert_eq!(mock.commands(), vec!["dotnet clean", "dotnet ef"]);
        assert_eq!(
            mock.calls()[1].dir.as_deref(),
            Some(Path::new("/repo/Schema"))
        );
    }

    #[test]
    fn mock_executor_failed_response_is_command_error() {
        let mock = test_helpers::MockExecutor::with_responses(vec![(false, "")]);
        let err = mock.run("dotnet", &["build"]).unwrap_err();
        assert!(err.downcast_ref::<CommandError>().is_some());
    }
}

//! Process execution.
//!
//! Everything nbsetup spawns goes through [`CommandRunner`] so the resolver,
//! installer and kernel registration can be driven by a fake in tests.

use crate::error::{Result, SetupError};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty when inherited).
    pub stdout: String,

    /// Standard error (empty when inherited).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    fn from_output(output: Output, duration: Duration) -> Self {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if output.status.success() {
            Self::success(stdout, stderr, duration)
        } else {
            Self::failure(output.status.code(), stdout, stderr, duration)
        }
    }

    /// Stdout followed by stderr.
    ///
    /// Some tools (older Pythons, docker-compose v1) print their version on
    /// stderr.
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Seam for spawning processes.
pub trait CommandRunner {
    /// Run `program` with `args`, capturing output.
    ///
    /// A program that cannot be spawned (missing, not executable) is an
    /// `Err`; a non-zero exit is an `Ok` with `success == false`.
    fn capture(&self, program: &Path, args: &[String]) -> std::io::Result<CommandResult>;

    /// Run `program` with `args`, inheriting stdio.
    fn run(&self, program: &Path, args: &[String]) -> Result<CommandResult>;

    /// Run a command line through the platform shell, inheriting stdio.
    fn run_shell(&self, command: &str) -> Result<CommandResult>;
}

/// Runner backed by real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn capture(&self, program: &Path, args: &[String]) -> std::io::Result<CommandResult> {
        let start = Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(CommandResult::from_output(output, start.elapsed()))
    }

    fn run(&self, program: &Path, args: &[String]) -> Result<CommandResult> {
        let mut command = Command::new(program);
        command.args(args);
        wait_inherited(command, display_command(program, args))
    }

    fn run_shell(&self, command: &str) -> Result<CommandResult> {
        wait_inherited(shell_command(command), command.to_string())
    }
}

/// Spawn `command` with inherited stdio and wait for it.
fn wait_inherited(mut command: Command, display: String) -> Result<CommandResult> {
    let start = Instant::now();
    let status = command
        .status()
        .map_err(|_| SetupError::ExternalToolFailure {
            command: display,
            code: None,
        })?;
    let duration = start.elapsed();
    if status.success() {
        Ok(CommandResult::success(String::new(), String::new(), duration))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            String::new(),
            String::new(),
            duration,
        ))
    }
}

/// Render a program and its arguments as a single display line.
pub fn display_command(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// Shell invocation for an opaque install command.
///
/// Install plans are plain POSIX `sh` lines on Unix and `cmd` lines on
/// Windows; the user's interactive shell configuration is not loaded.
/// `cmd /C` strips one pair of outer quotes, so the line is wrapped in
/// one and passed through unescaped.
#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    use std::os::windows::process::CommandExt;
    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(format!("\"{}\"", line));
    command
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

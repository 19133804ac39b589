//! Subprocess execution.
//!
//! Commands are described by a [`CommandSpec`] (program plus argument
//! vector, never a shell string) and executed by a [`CommandRunner`], so
//! installers can be exercised in tests without spawning anything.

use crate::error::{MachError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
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

    /// Captured stdout followed by captured stderr.
    pub fn combined_output(&self) -> String {
        let mut output = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&self.stderr);
        }
        output
    }
}

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,

    /// Arguments, passed verbatim.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables (merged with the process environment).
    pub env: Vec<(String, OsString)>,

    /// Capture stdout/stderr instead of inheriting the terminal.
    pub capture: bool,
}

impl CommandSpec {
    /// Start a spec for `program` with captured output.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            capture: true,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Let the child write straight to the terminal.
    pub fn inherit_output(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Human-readable command line, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Executes commands and locates programs.
///
/// Installers take a `&dyn CommandRunner` so tests can substitute
/// [`MockRunner`](super::MockRunner).
pub trait CommandRunner {
    /// Run the command to completion.
    ///
    /// A nonzero exit status is reported in the returned [`CommandResult`],
    /// not as an error; errors mean the program could not be started.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Find `program` on `PATH`.
    fn find_program(&self, program: &str) -> Option<PathBuf>;
}

/// Runner that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let start = Instant::now();
        tracing::debug!("Running: {}", spec.display());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        if spec.capture {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        let output = cmd.output().map_err(|e| MachError::CommandFailed {
            command: spec.display(),
            code: None,
            output: e.to_string(),
        })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            Ok(CommandResult::failure(
                output.status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }

    fn find_program(&self, program: &str) -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        let entries: Vec<PathBuf> = std::env::split_paths(&path).collect();
        super::lookup::resolve_tool_path(program, &entries)
    }
}

/// Run a command and turn a nonzero exit into [`MachError::CommandFailed`].
///
/// The error carries the captured output so the caller can print it before
/// exiting.
pub fn process_exec(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<CommandResult> {
    let result = runner.run(spec)?;
    if result.success {
        Ok(result)
    } else {
        Err(MachError::CommandFailed {
            command: spec.display(),
            code: result.exit_code,
            output: result.combined_output(),
        })
    }
}

/// Render a path for an argument list.
pub fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

//! Subprocess execution
//!
//! All external commands go through the `CommandRunner` trait so the
//! orchestrator can be exercised against a scripted runner in tests.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::tools;

/// A fully described command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// First subcommand argument (e.g. `deploy`, `projects:list`)
    pub fn subcommand(&self) -> Option<&str> {
        self.args
            .iter()
            .map(String::as_str)
            .find(|arg| !arg.starts_with('-'))
    }

    /// Printable form used in logs and error messages
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Last `n` non-empty stderr lines (falls back to stdout when stderr is empty)
    pub fn diagnostic_tail(&self, n: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Reasons a command could not produce a `CommandOutput`
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("`{program}` not found on PATH")]
    NotFound { program: String },

    #[error("Failed to run `{program}`: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}", human_duration(.timeout))]
    Timeout { program: String, timeout: Duration },
}

fn human_duration(duration: &Duration) -> String {
    humantime::format_duration(*duration).to_string()
}

/// Runs commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec`, waiting at most `timeout` for it to exit
    ///
    /// A non-zero exit is not an error here; callers inspect `CommandOutput::code`.
    async fn run(&self, spec: &CommandSpec, timeout: Duration)
        -> Result<CommandOutput, CommandError>;
}

/// Real runner backed by `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let program = tools::locate(&spec.program).ok_or_else(|| CommandError::NotFound {
            program: spec.program.clone(),
        })?;

        debug!("Running: {}", spec.display());

        let mut cmd = Command::new(&program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // killed when the wait future is dropped on timeout
            .kill_on_drop(true);

        if let Some(ref dir) = spec.current_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let child = cmd.spawn().map_err(|source| CommandError::Io {
            program: spec.program.clone(),
            source,
        })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                duration: start.elapsed(),
            }),
            Ok(Err(source)) => Err(CommandError::Io {
                program: spec.program.clone(),
                source,
            }),
            Err(_) => Err(CommandError::Timeout {
                program: spec.program.clone(),
                timeout,
            }),
        }
    }
}

//! Centralized error types for hostdeploy
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Fatal pipeline error. Any of these aborts the remaining steps.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] ConfigWriteError),

    #[error("Deploy error: {0}")]
    Deploy(#[from] DeployError),

    #[error("Timeout: {0}")]
    Timeout(#[from] TimeoutError),
}

/// Project lookup/creation and request validation errors
#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("`{tool}` not found. Install it (npm install -g firebase-tools) or set {env_var}")]
    ToolNotFound { tool: String, env_var: String },

    #[error("Invalid project id '{project_id}': {reason}")]
    InvalidProjectId { project_id: String, reason: String },

    #[error("Invalid site alias '{site}': {reason}")]
    InvalidSiteAlias { site: String, reason: String },

    #[error("Build directory not found: {}", .path.display())]
    BuildPathMissing { path: PathBuf },

    #[error("Build path is not a readable directory: {}", .path.display())]
    BuildPathUnreadable { path: PathBuf },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` did not finish within {}", format_limit(.limit))]
    TimedOut { command: String, limit: Duration },

    #[error("Unexpected output from `{command}`: {message}")]
    UnexpectedOutput { command: String, message: String },
}

/// Local hosting config file errors
#[derive(Error, Debug)]
pub enum ConfigWriteError {
    #[error("Failed to create config directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {file}: {source}")]
    Serialize {
        file: String,
        source: serde_json::Error,
    },
}

/// Deploy subprocess errors
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("firebase deploy exited with {}: {stderr}", exit_label(.code))]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Failed to run firebase deploy: {message}")]
    Spawn { message: String },
}

/// A step exceeded its caller-imposed wall-clock limit
#[derive(Error, Debug)]
#[error("{operation} exceeded its {} time limit", format_limit(.limit))]
pub struct TimeoutError {
    pub operation: String,
    pub limit: Duration,
}

/// Post-deploy verification problems. Never fatal for a deploy.
#[derive(Error, Debug)]
pub enum VerificationWarning {
    #[error("GET {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Settings file / argument resolution errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field} (pass {flag} or set it in the config file)")]
    MissingField { field: String, flag: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },
}

fn format_limit(limit: &Duration) -> String {
    humantime::format_duration(*limit).to_string()
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}

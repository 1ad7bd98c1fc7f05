//! Runtime tool path resolution
//!
//! For each external tool (e.g., `firebase`) we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g., `FIREBASE_BIN`)
//! 2. Fall back to PATH-based invocation if the envvar is not set
//!
//! This lets CI pin an exact `firebase-tools` install (e.g. a project-local
//! `node_modules/.bin/firebase`) while keeping PATH lookup for local use.

use std::env;
use std::path::PathBuf;

/// Common tool names
pub mod names {
    pub const FIREBASE: &str = "firebase";
}

/// Name of the environment variable that overrides a tool's path
///
/// Dashes become underscores so `firebase-tools` maps to `FIREBASE_TOOLS_BIN`.
pub fn tool_env_var(tool: &str) -> String {
    format!("{}_BIN", tool.to_uppercase().replace('-', "_"))
}

/// Get the path to an external tool
///
/// Returns the value of `{TOOL}_BIN` when set and non-empty, otherwise the
/// tool name itself (resolved against PATH when spawned).
pub fn get_tool_path(tool: &str) -> String {
    match env::var(tool_env_var(tool)) {
        Ok(path) if !path.trim().is_empty() => path,
        _ => tool.to_string(),
    }
}

/// Resolve a program to an executable on disk
///
/// Accepts bare names (PATH lookup) as well as relative or absolute paths.
pub fn locate(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

pub mod deploy;
pub mod init;
pub mod verify;

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{self, Overrides, ResolvedConfig};
use crate::infrastructure::{FirebaseCli, HttpProbe, ProcessRunner};
use crate::services::Orchestrator;
use crate::ui::ConsoleReporter;

/// Load the settings file and layer command-line values over it
pub fn resolve_config(
    settings_path: &Path,
    required: bool,
    overrides: Overrides,
) -> Result<ResolvedConfig> {
    let loaded = config::load_settings(settings_path, required)?;
    Ok(config::resolve(loaded, overrides)?)
}

/// Orchestrator wired to the real firebase binary, HTTP probe and console
pub fn build_orchestrator(resolved: &ResolvedConfig) -> Result<Orchestrator> {
    let firebase = FirebaseCli::new(Arc::new(ProcessRunner));
    let probe = HttpProbe::new(resolved.verify_timeout).context("Failed to build HTTP client")?;
    let reporter = ConsoleReporter::new(std::io::stdout().is_terminal());

    Ok(Orchestrator::new(
        firebase,
        Arc::new(probe),
        Arc::new(reporter),
        resolved.settings.clone(),
    ))
}

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use super::{build_orchestrator, resolve_config};
use crate::config::Overrides;

/// Provision, configure, deploy and verify in one run
pub async fn execute(settings_path: &Path, required: bool, overrides: Overrides) -> Result<()> {
    let resolved = resolve_config(settings_path, required, overrides)?;
    debug!("Resolved deploy configuration: {:?}", resolved);

    let orchestrator = build_orchestrator(&resolved)?;
    orchestrator.run(&resolved.request).await?;
    Ok(())
}

use std::path::Path;

use anyhow::Result;

use super::{build_orchestrator, resolve_config};
use crate::config::Overrides;
use crate::ui::print_success;

/// Make sure the project exists and write firebase.json / .firebaserc
pub async fn execute(settings_path: &Path, required: bool, overrides: Overrides) -> Result<()> {
    let resolved = resolve_config(settings_path, required, overrides)?;
    let orchestrator = build_orchestrator(&resolved)?;

    orchestrator.init(&resolved.request).await?;
    print_success(&format!(
        "Ready to deploy: hostdeploy deploy --project {}",
        resolved.request.project_id
    ));
    Ok(())
}

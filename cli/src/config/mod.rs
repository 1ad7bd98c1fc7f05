//! # Deployment Configuration
//!
//! Values are layered, highest precedence first:
//!
//! 1. Command-line arguments
//! 2. Environment variables (`FIREBASE_PROJECT`, `DASHBOARD_BUILD_PATH`, ...,
//!    handled by clap's `env` support)
//! 3. The settings file (`deploy.yaml` by default)
//! 4. Built-in defaults
//!
//! Relative paths in the settings file are resolved against the file's own
//! directory; relative paths from arguments against the working directory.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let file = config::load_settings(Path::new("deploy.yaml"), false)?;
//! let resolved = config::resolve(file, overrides)?;
//! orchestrator.run(&resolved.request).await?;
//! ```

mod settings;

pub use settings::{parse_duration, SettingsFile, TimeoutsConfig, VerifyConfig};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::DeployRequest;
use crate::error::ConfigError;
use crate::services::OrchestratorSettings;

/// Default settings file name
pub const DEFAULT_SETTINGS_FILE: &str = "deploy.yaml";

/// A settings file together with the directory its relative paths refer to
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub file: SettingsFile,
    pub base_dir: PathBuf,
}

impl Default for LoadedSettings {
    fn default() -> Self {
        Self {
            file: SettingsFile::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

/// Values given on the command line or via environment variables
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub build_path: Option<PathBuf>,
    pub site: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub display_name: Option<String>,
    pub message: Option<String>,
    pub deploy_timeout: Option<String>,
    pub site_url: Option<String>,
    pub no_verify: bool,
}

/// Everything needed to build an orchestrator and run it
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub request: DeployRequest,
    pub settings: OrchestratorSettings,
    pub verify_timeout: Duration,
}

/// Load the settings file
///
/// A missing file is only an error when it was asked for explicitly.
pub fn load_settings(path: &Path, required: bool) -> Result<LoadedSettings, ConfigError> {
    if !path.exists() {
        if required {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        return Ok(LoadedSettings::default());
    }

    let parse_err = |message: String| ConfigError::ParseError {
        path: path.display().to_string(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
    let file: SettingsFile = if content.trim().is_empty() {
        SettingsFile::default()
    } else {
        serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    };

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok(LoadedSettings { file, base_dir })
}

/// Merge overrides over the settings file
pub fn resolve(loaded: LoadedSettings, overrides: Overrides) -> Result<ResolvedConfig, ConfigError> {
    let LoadedSettings { file, base_dir } = loaded;
    let from_file = |path: PathBuf| rebase(&base_dir, path);

    let project_id = non_empty(overrides.project_id)
        .or_else(|| non_empty(file.project_id.clone()))
        .ok_or_else(|| ConfigError::MissingField {
            field: "project_id".to_string(),
            flag: "--project / FIREBASE_PROJECT".to_string(),
        })?;

    let build_path = overrides
        .build_path
        .or_else(|| file.build_path.clone().map(from_file))
        .ok_or_else(|| ConfigError::MissingField {
            field: "build_path".to_string(),
            flag: "--build-path / DASHBOARD_BUILD_PATH".to_string(),
        })?;

    let mut request = DeployRequest::new(project_id, build_path);
    if let Some(site) = non_empty(overrides.site).or_else(|| non_empty(file.site.clone())) {
        request = request.with_site(site);
    }

    let config_dir = overrides
        .config_dir
        .or_else(|| file.config_dir.clone().map(from_file))
        .unwrap_or_else(|| base_dir.clone());

    let mut hosting = file.hosting.clone();
    hosting.public = hosting.public.map(from_file);

    let deploy_timeout = match overrides.deploy_timeout {
        Some(ref value) => parse_duration("--timeout", value)?,
        None => parse_duration("timeouts.deploy", &file.timeouts.deploy)?,
    };

    let settings = OrchestratorSettings {
        config_dir,
        hosting,
        display_name: non_empty(overrides.display_name)
            .or_else(|| non_empty(file.display_name.clone())),
        deploy_message: non_empty(overrides.message),
        provision_timeout: parse_duration("timeouts.provision", &file.timeouts.provision)?,
        deploy_timeout,
        verify: file.verify.enabled && !overrides.no_verify,
        site_url: non_empty(overrides.site_url).or_else(|| non_empty(file.verify.url.clone())),
    };

    Ok(ResolvedConfig {
        request,
        settings,
        verify_timeout: parse_duration("timeouts.verify", &file.timeouts.verify)?,
    })
}

fn rebase(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || base_dir == Path::new(".") {
        path
    } else {
        base_dir.join(path)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//! `deploy.yaml` settings file schema.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::HostingOptions;
use crate::error::ConfigError;

/// Settings file contents. Every field is optional; CLI/env values win.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsFile {
    /// Firebase project id
    #[serde(default)]
    pub project_id: Option<String>,

    /// Display name used when the project has to be created
    #[serde(default)]
    pub display_name: Option<String>,

    /// Dashboard build directory (relative to this file)
    #[serde(default)]
    pub build_path: Option<PathBuf>,

    /// Hosting site (defaults to the project id)
    #[serde(default)]
    pub site: Option<String>,

    /// Where firebase.json / .firebaserc are written (relative to this file)
    #[serde(default)]
    pub config_dir: Option<PathBuf>,

    /// firebase.json hosting options
    #[serde(default)]
    pub hosting: HostingOptions,

    /// Per-step time limits
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Post-deploy verification
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// Time limits as humantime strings ("90s", "10m")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_provision_timeout")]
    pub provision: String,

    #[serde(default = "default_deploy_timeout")]
    pub deploy: String,

    #[serde(default = "default_verify_timeout")]
    pub verify: String,
}

fn default_provision_timeout() -> String {
    "2m".to_string()
}

fn default_deploy_timeout() -> String {
    "10m".to_string()
}

fn default_verify_timeout() -> String {
    "30s".to_string()
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            provision: default_provision_timeout(),
            deploy: default_deploy_timeout(),
            verify: default_verify_timeout(),
        }
    }
}

/// Verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_verify_enabled")]
    pub enabled: bool,

    /// URL to check instead of the one printed by `firebase deploy`
    #[serde(default)]
    pub url: Option<String>,
}

fn default_verify_enabled() -> bool {
    true
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_verify_enabled(),
            url: None,
        }
    }
}

/// Parse a humantime duration ("30s", "2m", "1h 30m"); bare numbers are seconds
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    };

    let duration = match value.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(value).map_err(|_| invalid())?,
    };

    if duration.is_zero() {
        return Err(invalid());
    }
    Ok(duration)
}

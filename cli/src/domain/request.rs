//! Deployment request
//!
//! Built once from arguments, environment and settings file, then consumed
//! by the orchestrator. Never persisted.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProvisioningError;

/// Firebase project ids: 6-30 chars, lowercase letters, digits and hyphens,
/// starting with a letter and not ending with a hyphen.
const PROJECT_ID_PATTERN: &str = r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$";

/// Hosting site names: lowercase letters, digits and hyphens, no leading or
/// trailing hyphen.
const SITE_PATTERN: &str = r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$";

// Constant patterns, compiled once; covered by the rule tests below
static PROJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROJECT_ID_PATTERN).expect("valid project id pattern"));
static SITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SITE_PATTERN).expect("valid site pattern"));

/// What to deploy and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Firebase project id
    pub project_id: String,
    /// Local directory holding the static dashboard build
    pub build_path: PathBuf,
    /// Hosting site to deploy to (defaults to the project id)
    pub site_alias: String,
}

impl DeployRequest {
    /// Create a request targeting the project's default site
    pub fn new(project_id: impl Into<String>, build_path: impl Into<PathBuf>) -> Self {
        let project_id = project_id.into();
        Self {
            site_alias: project_id.clone(),
            project_id,
            build_path: build_path.into(),
        }
    }

    /// Builder: target a specific hosting site
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        let site = site.into();
        if !site.trim().is_empty() {
            self.site_alias = site.trim().to_string();
        }
        self
    }

    /// True when deploying to a site other than the project's default one
    pub fn has_custom_site(&self) -> bool {
        self.site_alias != self.project_id
    }

    /// Public URL Firebase assigns to the target site
    pub fn default_site_url(&self) -> String {
        format!("https://{}.web.app", self.site_alias)
    }

    /// Validate identifiers and the build directory
    ///
    /// Runs before any subprocess is spawned so that a bad request fails fast.
    pub fn validate(&self) -> Result<(), ProvisioningError> {
        validate_project_id(&self.project_id)?;
        validate_site(&self.site_alias)?;
        check_build_path(&self.build_path)
    }
}

fn validate_project_id(project_id: &str) -> Result<(), ProvisioningError> {
    let invalid = |reason: &str| ProvisioningError::InvalidProjectId {
        project_id: project_id.to_string(),
        reason: reason.to_string(),
    };

    if project_id.len() < 6 || project_id.len() > 30 {
        return Err(invalid("must be 6 to 30 characters long"));
    }

    if !PROJECT_ID_RE.is_match(project_id) {
        return Err(invalid(
            "use lowercase letters, digits and hyphens; start with a letter; do not end with a hyphen",
        ));
    }

    Ok(())
}

fn validate_site(site: &str) -> Result<(), ProvisioningError> {
    if !SITE_RE.is_match(site) {
        return Err(ProvisioningError::InvalidSiteAlias {
            site: site.to_string(),
            reason: "use lowercase letters, digits and hyphens only".to_string(),
        });
    }

    Ok(())
}

/// Build directory must exist, be a directory and be listable
pub fn check_build_path(path: &Path) -> Result<(), ProvisioningError> {
    if !path.exists() {
        return Err(ProvisioningError::BuildPathMissing {
            path: path.to_path_buf(),
        });
    }

    if !path.is_dir() || std::fs::read_dir(path).is_err() {
        return Err(ProvisioningError::BuildPathUnreadable {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults_to_project() {
        let request = DeployRequest::new("ops-dashboard", "dist");
        assert_eq!(request.site_alias, "ops-dashboard");
        assert!(!request.has_custom_site());
        assert_eq!(request.default_site_url(), "https://ops-dashboard.web.app");
    }

    #[test]
    fn test_with_site_overrides_alias() {
        let request = DeployRequest::new("ops-dashboard", "dist").with_site("ops-staging");
        assert!(request.has_custom_site());
        assert_eq!(request.default_site_url(), "https://ops-staging.web.app");

        let blank = DeployRequest::new("ops-dashboard", "dist").with_site("  ");
        assert_eq!(blank.site_alias, "ops-dashboard");
    }

    #[test]
    fn test_validate_accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let request = DeployRequest::new("ops-dashboard", dir.path());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_build_path() {
        let dir = tempfile::tempdir().unwrap();
        let request = DeployRequest::new("ops-dashboard", dir.path().join("dist"));
        assert!(matches!(
            request.validate(),
            Err(ProvisioningError::BuildPathMissing { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_file_as_build_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();
        let request = DeployRequest::new("ops-dashboard", &file);
        assert!(matches!(
            request.validate(),
            Err(ProvisioningError::BuildPathUnreadable { .. })
        ));
    }

    #[test]
    fn test_project_id_rules() {
        assert!(validate_project_id("my-project-123").is_ok());
        assert!(validate_project_id("short").is_err());
        assert!(validate_project_id("1starts-with-digit").is_err());
        assert!(validate_project_id("ends-with-hyphen-").is_err());
        assert!(validate_project_id("Upper-Case-Id").is_err());
        assert!(validate_project_id("has_underscore").is_err());
        assert!(validate_project_id(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_site_rules() {
        assert!(validate_site("a").is_ok());
        assert!(validate_site("ops-staging-2").is_ok());
        assert!(validate_site("-leading").is_err());
        assert!(validate_site("trailing-").is_err());
        assert!(validate_site("has.dot").is_err());
    }
}

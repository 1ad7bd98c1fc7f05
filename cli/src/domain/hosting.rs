//! Hosting configuration model
//!
//! `HostingOptions` is what the user configures; `FirebaseJson` and
//! `FirebaseRc` are the exact documents written next to the build for the
//! `firebase` CLI to read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Hosting config file read by `firebase deploy`
pub const FIREBASE_JSON: &str = "firebase.json";

/// Project alias file read by the `firebase` CLI
pub const FIREBASE_RC: &str = ".firebaserc";

/// A single-page-app rewrite: requests matching `source` are served `destination`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub source: String,
    pub destination: String,
}

impl RewriteRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Recognized hosting options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingOptions {
    /// Hosting root directory; `None` means "the request's build path"
    #[serde(default)]
    pub public: Option<PathBuf>,

    /// Glob patterns Firebase should skip when uploading
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Rewrite rules (default routes everything to the dashboard's index.html)
    #[serde(default = "default_rewrites")]
    pub rewrites: Vec<RewriteRule>,
}

fn default_ignore() -> Vec<String> {
    vec![
        FIREBASE_JSON.to_string(),
        "**/.*".to_string(),
        "**/node_modules/**".to_string(),
    ]
}

fn default_rewrites() -> Vec<RewriteRule> {
    vec![RewriteRule::new("**", "/index.html")]
}

impl Default for HostingOptions {
    fn default() -> Self {
        Self {
            public: None,
            ignore: default_ignore(),
            rewrites: default_rewrites(),
        }
    }
}

impl HostingOptions {
    /// Builder: set the hosting root directory
    pub fn with_public(mut self, public: impl Into<PathBuf>) -> Self {
        self.public = Some(public.into());
        self
    }
}

/// `hosting` section of `firebase.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostingSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub public: String,
    pub ignore: Vec<String>,
    pub rewrites: Vec<RewriteRule>,
}

/// Full `firebase.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirebaseJson {
    pub hosting: HostingSection,
}

impl FirebaseJson {
    /// Render options into the document written into `config_dir`
    ///
    /// `public` falls back to `build_path` and is made relative to
    /// `config_dir` when it lives beneath it, so the generated file stays
    /// portable across checkouts.
    pub fn render(
        options: &HostingOptions,
        build_path: &Path,
        config_dir: &Path,
        site: Option<&str>,
    ) -> Self {
        let public = options.public.as_deref().unwrap_or(build_path);
        let public = relative_to(public, config_dir);

        Self {
            hosting: HostingSection {
                site: site.map(str::to_string),
                public,
                ignore: options.ignore.clone(),
                rewrites: options.rewrites.clone(),
            },
        }
    }
}

/// `.firebaserc` document: maps the `default` alias to the project id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseRc {
    pub projects: BTreeMap<String, String>,
}

impl FirebaseRc {
    pub fn for_project(project_id: &str) -> Self {
        let mut projects = BTreeMap::new();
        projects.insert("default".to_string(), project_id.to_string());
        Self { projects }
    }
}

fn relative_to(path: &Path, base: &Path) -> String {
    match relative_path(path, base) {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.to_string_lossy().replace('\\', "/"),
        None => path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .to_string(),
    }
}

fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(rel.to_path_buf());
    }
    let path = path.canonicalize().ok()?;
    let base = base.canonicalize().ok()?;
    path.strip_prefix(&base).ok().map(Path::to_path_buf)
}

//! CLI definitions for hostdeploy
//!
//! This module contains all CLI argument parsing structures using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Overrides, DEFAULT_SETTINGS_FILE};

#[derive(Parser)]
#[command(
    name = "hostdeploy",
    version,
    about = "Firebase Hosting provisioning and dashboard deployment",
    long_about = "Creates the Firebase project if needed, writes firebase.json and .firebaserc,\n\
                  deploys the dashboard build and smoke-checks the live site."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (optional unless given explicitly)
    #[arg(long, global = true, env = "HOSTDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings file path and whether it must exist
    pub fn settings_path(&self) -> (PathBuf, bool) {
        match self.config {
            Some(ref path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provision the project, write hosting config, deploy and verify
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Time limit for `firebase deploy` (e.g. 90s, 10m)
        #[arg(long)]
        timeout: Option<String>,

        /// Deploy message shown in the Firebase console
        #[arg(short, long)]
        message: Option<String>,

        /// Skip the post-deploy smoke check
        #[arg(long)]
        no_verify: bool,

        /// URL to smoke-check instead of the one printed by the CLI
        #[arg(long, env = "SITE_URL")]
        site_url: Option<String>,
    },

    /// Provision the project and write hosting config, without deploying
    Init {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Smoke-check a deployed site (fails on non-2xx)
    Verify {
        /// Site URL to GET
        #[arg(long, required = true)]
        url: String,

        /// Request timeout (e.g. 30s); defaults to `timeouts.verify`
        #[arg(long)]
        timeout: Option<String>,
    },
}

/// Project/build selection shared by `deploy` and `init`
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Firebase project id
    #[arg(long, env = "FIREBASE_PROJECT")]
    pub project: Option<String>,

    /// Dashboard build directory to deploy
    #[arg(long, env = "DASHBOARD_BUILD_PATH")]
    pub build_path: Option<PathBuf>,

    /// Hosting site (defaults to the project id)
    #[arg(long, env = "FIREBASE_SITE")]
    pub site: Option<String>,

    /// Directory for firebase.json / .firebaserc
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Display name when the project has to be created
    #[arg(long)]
    pub display_name: Option<String>,
}

impl From<TargetArgs> for Overrides {
    fn from(target: TargetArgs) -> Self {
        Overrides {
            project_id: target.project,
            build_path: target.build_path,
            site: target.site,
            config_dir: target.config_dir,
            display_name: target.display_name,
            ..Default::default()
        }
    }
}

//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Subprocesses (the `firebase` CLI)
//! - HTTP (post-deploy smoke check)

pub mod firebase;
pub mod process;
pub mod site_probe;

// Re-export commonly used types
pub use firebase::{FirebaseCli, ProjectInfo};
pub use process::{CommandError, CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use site_probe::{check_site, HttpProbe, ProbeResponse, SiteProbe};

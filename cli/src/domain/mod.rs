//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O beyond
//! inspecting the local build directory during validation.
//! Types and functions here can be unit tested without mocking.

pub mod hosting;
pub mod pipeline;
pub mod request;

// Re-export commonly used types
pub use hosting::{FirebaseRc, HostingOptions, RewriteRule};
pub use pipeline::{
    DeployResult, PipelinePhase, PipelineStep, ProjectStatus, RunReport, StepResult,
    VerificationOutcome,
};
pub use request::DeployRequest;

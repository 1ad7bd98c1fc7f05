//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod config_writer;
pub mod orchestrator;

// Re-export commonly used types
pub use orchestrator::{Orchestrator, OrchestratorSettings};

//! Deployment pipeline domain types
//!
//! The pipeline is a fixed sequence of steps. Each step either completes or
//! fails the whole run; there is no branching state machine.

use std::time::Duration;

/// Individual steps of a deployment, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Validate the request, check/create the hosting project
    Provision,
    /// Write firebase.json and .firebaserc
    Configure,
    /// Upload the build directory
    Deploy,
    /// Smoke-check the live site
    Verify,
}

impl PipelineStep {
    /// Get human-readable name for the step
    pub fn name(&self) -> &'static str {
        match self {
            Self::Provision => "Provision",
            Self::Configure => "Configure",
            Self::Deploy => "Deploy",
            Self::Verify => "Verify",
        }
    }

    /// Get emoji for the step
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Provision => "🏗️",
            Self::Configure => "📝",
            Self::Deploy => "🚀",
            Self::Verify => "🔍",
        }
    }

    /// Steps run by `deploy`
    pub fn full() -> Vec<PipelineStep> {
        vec![Self::Provision, Self::Configure, Self::Deploy, Self::Verify]
    }

    /// Steps run by `init` (no upload)
    pub fn setup_only() -> Vec<PipelineStep> {
        vec![Self::Provision, Self::Configure]
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Not started
    Pending,
    /// Currently executing
    InProgress(PipelineStep),
    /// Completed successfully
    Completed,
    /// Failed at a specific step
    Failed(PipelineStep),
}

/// Whether the hosting project had to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Existing,
    Created,
}

/// Outcome of a successful `firebase deploy`
#[derive(Debug, Clone, Default)]
pub struct DeployResult {
    /// URL printed by the CLI (`Hosting URL: ...`), if any
    pub hosting_url: Option<String>,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl DeployResult {
    /// Extract the `Hosting URL:` line the firebase CLI prints on success
    pub fn parse_hosting_url(stdout: &str) -> Option<String> {
        stdout.lines().find_map(|line| {
            let (_, rest) = line.split_once("Hosting URL:")?;
            let url = rest.trim();
            url.starts_with("http").then(|| url.to_string())
        })
    }
}

/// Outcome of the verification step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// 2xx response
    Passed { url: String, status: u16 },
    /// Non-2xx or network failure; logged, not fatal
    Warned { url: String, message: String },
    /// Verification disabled
    Skipped,
}

/// Result of a pipeline step execution
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: PipelineStep,
    pub success: bool,
    pub duration: Duration,
    pub message: Option<String>,
}

impl StepResult {
    pub fn success(step: PipelineStep, duration: Duration) -> Self {
        Self {
            step,
            success: true,
            duration,
            message: None,
        }
    }

    pub fn failure(step: PipelineStep, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            step,
            success: false,
            duration,
            message: Some(message.into()),
        }
    }
}

/// Everything a run produced, for the final summary
#[derive(Debug, Clone)]
pub struct RunReport {
    pub project_id: String,
    pub phase: PipelinePhase,
    pub results: Vec<StepResult>,
    pub project_status: Option<ProjectStatus>,
    pub hosting_url: Option<String>,
    pub verification: VerificationOutcome,
}

impl RunReport {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            phase: PipelinePhase::Pending,
            results: Vec::new(),
            project_status: None,
            hosting_url: None,
            verification: VerificationOutcome::Skipped,
        }
    }

    /// Latest step that finished successfully
    pub fn last_completed_step(&self) -> Option<PipelineStep> {
        self.results
            .iter()
            .rev()
            .find(|result| result.success)
            .map(|result| result.step)
    }

    pub fn succeeded(&self) -> bool {
        self.phase == PipelinePhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(
            PipelineStep::full(),
            vec![
                PipelineStep::Provision,
                PipelineStep::Configure,
                PipelineStep::Deploy,
                PipelineStep::Verify
            ]
        );
        assert!(!PipelineStep::setup_only().contains(&PipelineStep::Deploy));
    }

    #[test]
    fn test_parse_hosting_url() {
        let stdout = "\n=== Deploying to 'ops-dashboard'...\n\n✔  Deploy complete!\n\n\
                      Project Console: https://console.firebase.google.com/project/ops-dashboard/overview\n\
                      Hosting URL: https://ops-dashboard.web.app\n";
        assert_eq!(
            DeployResult::parse_hosting_url(stdout).as_deref(),
            Some("https://ops-dashboard.web.app")
        );
        assert!(DeployResult::parse_hosting_url("✔  Deploy complete!").is_none());
    }

    #[test]
    fn test_last_completed_step() {
        let mut report = RunReport::new("ops-dashboard");
        assert!(report.last_completed_step().is_none());

        report
            .results
            .push(StepResult::success(PipelineStep::Provision, Duration::ZERO));
        report
            .results
            .push(StepResult::success(PipelineStep::Configure, Duration::ZERO));
        report.results.push(StepResult::failure(
            PipelineStep::Deploy,
            Duration::ZERO,
            "exit code 1",
        ));

        assert_eq!(report.last_completed_step(), Some(PipelineStep::Configure));
        assert!(!report.succeeded());
    }
}

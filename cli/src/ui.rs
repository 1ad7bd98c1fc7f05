// Terminal UI and progress reporting
//
// The orchestrator never prints directly; it talks to a `Reporter` handed to
// it at construction time.

use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::domain::{
    DeployRequest, PipelinePhase, PipelineStep, RunReport, StepResult, VerificationOutcome,
};

/// Receives progress events from the orchestrator
pub trait Reporter: Send + Sync {
    fn run_started(&self, request: &DeployRequest, steps: &[PipelineStep]);
    fn step_started(&self, step: PipelineStep);
    fn step_finished(&self, result: &StepResult);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    /// Output captured from a finished subprocess
    fn captured_output(&self, label: &str, stdout: &str, stderr: &str);
    fn summary(&self, report: &RunReport);
}

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Reporter for interactive and CI terminals
pub struct ConsoleReporter {
    spinners: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(spinners: bool) -> Self {
        Self {
            spinners,
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: String) {
        if !self.spinners {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&self, request: &DeployRequest, steps: &[PipelineStep]) {
        print_header(&format!("Firebase Hosting: {}", request.project_id));
        info!("Project: {}", request.project_id);
        info!("Site: {}", request.site_alias);
        info!("Build: {}", request.build_path.display());
        info!(
            "Steps: {}",
            steps.iter().map(|s| s.name()).collect::<Vec<_>>().join(" → ")
        );
        println!();
    }

    fn step_started(&self, step: PipelineStep) {
        info!("━━━ {} {} ━━━", step.emoji(), step.name());
        self.start_spinner(format!("{}...", step.name()));
    }

    fn step_finished(&self, result: &StepResult) {
        self.stop_spinner();
        let secs = result.duration.as_secs_f64();
        if result.success {
            info!("{} {} completed in {:.1}s", "✅".green(), result.step.name(), secs);
        } else {
            error!(
                "{} {} failed after {:.1}s: {}",
                "❌".red(),
                result.step.name(),
                secs,
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    fn info(&self, message: &str) {
        info!("   {}", message);
    }

    fn warning(&self, message: &str) {
        warn!("⚠️  {}", message);
    }

    fn captured_output(&self, label: &str, stdout: &str, stderr: &str) {
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!("[{} stdout] {}", label, line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            warn!("[{} stderr] {}", label, line);
        }
    }

    fn summary(&self, report: &RunReport) {
        self.stop_spinner();
        println!();
        println!(
            "{}",
            "════════════════════════════════════════════════════════════".bright_blue()
        );

        if report.succeeded() {
            print_success(&format!("Deployment completed: {}", report.project_id));
        }
        if let PipelinePhase::Failed(step) = report.phase {
            print_error(&format!(
                "Deployment failed at {}: {}",
                step.name(),
                report.project_id
            ));
            match report.last_completed_step() {
                Some(last) => println!("   Last completed step: {}", last.name()),
                None => println!("   No step completed"),
            }
        }

        println!();
        for result in &report.results {
            let status = if result.success { "✅" } else { "❌" };
            println!(
                "   {} {} ({:.1}s)",
                status,
                result.step.name(),
                result.duration.as_secs_f64()
            );
        }

        if let Some(ref url) = report.hosting_url {
            println!();
            println!("   Hosting URL: {}", url.cyan());
        }
        if let VerificationOutcome::Warned { ref url, ref message } = report.verification {
            print_warning(&format!("Verification of {} failed: {}", url, message));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_disabled_is_noop() {
        let reporter = ConsoleReporter::new(false);
        reporter.step_started(PipelineStep::Deploy);
        assert!(reporter.spinner.lock().unwrap().is_none());
        reporter.step_finished(&StepResult::success(PipelineStep::Deploy, Duration::ZERO));
    }

    #[test]
    fn test_summary_clears_running_spinner() {
        let reporter = ConsoleReporter::new(true);
        reporter.step_started(PipelineStep::Provision);
        assert!(reporter.spinner.lock().unwrap().is_some());

        let mut report = RunReport::new("ops-dashboard");
        report.phase = PipelinePhase::Failed(PipelineStep::Provision);
        reporter.summary(&report);
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}

//! Deployment orchestrator
//!
//! Runs Provision → Configure → Deploy → Verify strictly in order. Each step
//! returns a `Result`; the first fatal error stops the run and the summary
//! reports the latest completed step. Verification problems are warnings.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::hosting::{FirebaseJson, FirebaseRc, HostingOptions, FIREBASE_JSON};
use crate::domain::request::check_build_path;
use crate::domain::{
    DeployRequest, DeployResult, PipelinePhase, PipelineStep, ProjectStatus, RunReport,
    StepResult, VerificationOutcome,
};
use crate::error::{ConfigWriteError, PipelineError, ProvisioningError, VerificationWarning};
use crate::infrastructure::{check_site, FirebaseCli, SiteProbe};
use crate::services::config_writer::{write_hosting_config, WrittenConfig};
use crate::ui::Reporter;

/// Time limits and knobs for a run
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Directory receiving firebase.json / .firebaserc
    pub config_dir: PathBuf,
    pub hosting: HostingOptions,
    /// Used when the project has to be created
    pub display_name: Option<String>,
    pub deploy_message: Option<String>,
    pub provision_timeout: Duration,
    pub deploy_timeout: Duration,
    /// Skip the Verify step entirely
    pub verify: bool,
    /// Overrides the URL checked by Verify
    pub site_url: Option<String>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            hosting: HostingOptions::default(),
            display_name: None,
            deploy_message: None,
            provision_timeout: Duration::from_secs(120),
            deploy_timeout: Duration::from_secs(600),
            verify: true,
            site_url: None,
        }
    }
}

/// Drives one deployment
pub struct Orchestrator {
    firebase: FirebaseCli,
    probe: Arc<dyn SiteProbe>,
    reporter: Arc<dyn Reporter>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        firebase: FirebaseCli,
        probe: Arc<dyn SiteProbe>,
        reporter: Arc<dyn Reporter>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            firebase,
            probe,
            reporter,
            settings,
        }
    }

    /// Full pipeline: provision, configure, deploy, verify
    pub async fn run(&self, request: &DeployRequest) -> Result<RunReport, PipelineError> {
        self.run_steps(request, &PipelineStep::full()).await
    }

    /// Provision + configure only
    pub async fn init(&self, request: &DeployRequest) -> Result<RunReport, PipelineError> {
        self.run_steps(request, &PipelineStep::setup_only()).await
    }

    async fn run_steps(
        &self,
        request: &DeployRequest,
        steps: &[PipelineStep],
    ) -> Result<RunReport, PipelineError> {
        self.reporter.run_started(request, steps);
        let mut report = RunReport::new(&request.project_id);
        let mut config_path = self.settings.config_dir.join(FIREBASE_JSON);

        for &step in steps {
            match step {
                PipelineStep::Provision => {
                    let status = self
                        .step(&mut report, step, async {
                            request.validate()?;
                            check_build_path(self.hosting_root(request))?;
                            Ok::<_, PipelineError>(self.ensure_project(&request.project_id).await?)
                        })
                        .await?;
                    report.project_status = Some(status);
                }
                PipelineStep::Configure => {
                    let written = self
                        .step(&mut report, step, async {
                            Ok::<_, PipelineError>(
                                self.write_config(&self.settings.config_dir, request)?,
                            )
                        })
                        .await?;
                    config_path = written.firebase_json;
                }
                PipelineStep::Deploy => {
                    let result = self
                        .step(&mut report, step, async {
                            self.deploy(&request.project_id, self.hosting_root(request), &config_path)
                                .await
                        })
                        .await?;
                    debug!("firebase deploy took {:.1}s", result.duration.as_secs_f64());
                    report.hosting_url = result.hosting_url;
                }
                PipelineStep::Verify => {
                    if !self.settings.verify {
                        self.reporter.info("Verification disabled, skipping");
                        continue;
                    }
                    let url = self.verification_url(request, report.hosting_url.as_deref());
                    let outcome = self
                        .step(&mut report, step, async {
                            Ok::<_, PipelineError>(self.check(&url).await)
                        })
                        .await?;
                    report.verification = outcome;
                }
            }
        }

        report.phase = PipelinePhase::Completed;
        self.reporter.summary(&report);
        Ok(report)
    }

    /// Directory Firebase uploads: `hosting.public` when set, else the build path
    fn hosting_root<'a>(&'a self, request: &'a DeployRequest) -> &'a Path {
        self.settings
            .hosting
            .public
            .as_deref()
            .unwrap_or(&request.build_path)
    }

    /// Time one step, record its result, emit progress and stop on error
    async fn step<T, F>(
        &self,
        report: &mut RunReport,
        step: PipelineStep,
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        report.phase = PipelinePhase::InProgress(step);
        self.reporter.step_started(step);
        let start = Instant::now();

        match work.await {
            Ok(value) => {
                let result = StepResult::success(step, start.elapsed());
                self.reporter.step_finished(&result);
                report.results.push(result);
                Ok(value)
            }
            Err(e) => {
                let result = StepResult::failure(step, start.elapsed(), e.to_string());
                self.reporter.step_finished(&result);
                report.results.push(result);
                report.phase = PipelinePhase::Failed(step);
                self.reporter.summary(report);
                Err(e)
            }
        }
    }

    /// Check the CLI is usable, look the project up and create it if absent
    pub async fn ensure_project(&self, project_id: &str) -> Result<ProjectStatus, ProvisioningError> {
        let timeout = self.settings.provision_timeout;

        let version = self.firebase.version(timeout).await?;
        self.reporter.info(&format!(
            "{} {}",
            self.firebase.program(),
            version.lines().next().unwrap_or("")
        ));

        let projects = self.firebase.list_projects(timeout).await?;
        if let Some(existing) = projects.iter().find(|p| p.project_id == project_id) {
            self.reporter.info(&format!(
                "Project {} already exists ({})",
                project_id,
                existing.display_name.as_deref().unwrap_or("no display name")
            ));
            return Ok(ProjectStatus::Existing);
        }

        let display_name = self
            .settings
            .display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(project_id);
        self.reporter.info(&format!(
            "Project {} not found, creating it as \"{}\"",
            project_id, display_name
        ));
        self.firebase
            .create_project(project_id, display_name, timeout)
            .await?;

        Ok(ProjectStatus::Created)
    }

    /// Render and write firebase.json / .firebaserc for `request` into `dir`
    pub fn write_config(
        &self,
        dir: &Path,
        request: &DeployRequest,
    ) -> Result<WrittenConfig, ConfigWriteError> {
        let site = request
            .has_custom_site()
            .then_some(request.site_alias.as_str());
        let hosting = FirebaseJson::render(&self.settings.hosting, &request.build_path, dir, site);
        let rc = FirebaseRc::for_project(&request.project_id);

        let written = write_hosting_config(dir, &hosting, &rc)?;
        self.reporter.info(&format!(
            "Wrote {} (public: {})",
            written.firebase_json.display(),
            hosting.hosting.public
        ));
        Ok(written)
    }

    /// Upload `build_path` (the hosting root) with `firebase deploy --only hosting`
    pub async fn deploy(
        &self,
        project_id: &str,
        build_path: &Path,
        config_path: &Path,
    ) -> Result<DeployResult, PipelineError> {
        check_build_path(build_path)?;

        let start = Instant::now();
        let output = self
            .firebase
            .deploy_hosting(
                project_id,
                config_path,
                self.settings.deploy_message.as_deref(),
                self.settings.deploy_timeout,
            )
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                if let PipelineError::Deploy(ref err) = e {
                    self.reporter.warning(&err.to_string());
                }
                return Err(e);
            }
        };

        self.reporter
            .captured_output("firebase deploy", &output.stdout, &output.stderr);

        let hosting_url = DeployResult::parse_hosting_url(&output.stdout);
        if let Some(ref url) = hosting_url {
            self.reporter.info(&format!("Hosting URL: {}", url));
        }

        Ok(DeployResult {
            hosting_url,
            duration: start.elapsed(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Single GET against the live site; `true` on any 2xx
    ///
    /// Failures are reported as warnings and never abort the run.
    pub async fn verify(&self, site_url: &str) -> bool {
        matches!(self.check(site_url).await, VerificationOutcome::Passed { .. })
    }

    async fn check(&self, url: &str) -> VerificationOutcome {
        match self.probe_site(url).await {
            Ok(status) => {
                self.reporter
                    .info(&format!("GET {} → HTTP {}", url, status));
                VerificationOutcome::Passed {
                    url: url.to_string(),
                    status,
                }
            }
            Err(warning) => {
                self.reporter.warning(&warning.to_string());
                VerificationOutcome::Warned {
                    url: url.to_string(),
                    message: warning.to_string(),
                }
            }
        }
    }

    /// Status code of a successful GET, or why it did not succeed
    pub async fn probe_site(&self, url: &str) -> Result<u16, VerificationWarning> {
        check_site(self.probe.as_ref(), url).await
    }

    /// `--site-url` wins, then the URL the CLI printed, then `<site>.web.app`
    fn verification_url(&self, request: &DeployRequest, hosting_url: Option<&str>) -> String {
        self.settings
            .site_url
            .clone()
            .or_else(|| hosting_url.map(str::to_string))
            .unwrap_or_else(|| request.default_site_url())
    }
}

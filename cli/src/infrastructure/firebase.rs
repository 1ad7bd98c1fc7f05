//! Firebase CLI adapter
//!
//! Wraps the `firebase` command-line tool. Only argument construction and
//! output interpretation live here; process handling is the runner's job.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{DeployError, PipelineError, ProvisioningError, TimeoutError};
use crate::infrastructure::process::{CommandError, CommandOutput, CommandRunner, CommandSpec};
use crate::tools;

/// Lines of stderr kept in error messages
const DIAGNOSTIC_LINES: usize = 20;

/// Entry of `firebase projects:list --json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub project_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Envelope the firebase CLI prints with `--json`
#[derive(Debug, Deserialize)]
struct JsonEnvelope<T> {
    status: String,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the `firebase` CLI
#[derive(Clone)]
pub struct FirebaseCli {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl FirebaseCli {
    /// Use `FIREBASE_BIN` if set, else `firebase` from PATH
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_program(tools::get_tool_path(tools::names::FIREBASE), runner)
    }

    pub fn with_program(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program.clone())
    }

    /// `firebase --version`: confirms the CLI is installed and runnable
    pub async fn version(&self, timeout: Duration) -> Result<String, ProvisioningError> {
        let spec = self.command().arg("--version");
        let output = self.run_provisioning(&spec, timeout).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// `firebase projects:list --json`
    pub async fn list_projects(
        &self,
        timeout: Duration,
    ) -> Result<Vec<ProjectInfo>, ProvisioningError> {
        let spec = self.command().args(["projects:list", "--json"]);
        let output = self.run_provisioning(&spec, timeout).await?;
        parse_project_list(&output.stdout).map_err(|message| {
            ProvisioningError::UnexpectedOutput {
                command: spec.display(),
                message,
            }
        })
    }

    /// `firebase projects:create <id> --display-name <name> --non-interactive`
    pub async fn create_project(
        &self,
        project_id: &str,
        display_name: &str,
        timeout: Duration,
    ) -> Result<(), ProvisioningError> {
        let spec = self.command().args([
            "projects:create",
            project_id,
            "--display-name",
            display_name,
            "--non-interactive",
        ]);
        self.run_provisioning(&spec, timeout).await?;
        Ok(())
    }

    /// Command line for `firebase deploy --only hosting`
    pub fn deploy_command(
        &self,
        project_id: &str,
        config_path: &Path,
        message: Option<&str>,
    ) -> CommandSpec {
        // --config is resolved relative to the working directory, which is
        // the config file's own directory when it has one
        let dir = config_path.parent().filter(|d| !d.as_os_str().is_empty());
        let config_arg = match (dir, config_path.file_name()) {
            (Some(_), Some(name)) => name.to_string_lossy().to_string(),
            _ => config_path.to_string_lossy().to_string(),
        };

        let mut spec = self
            .command()
            .args(["deploy", "--only", "hosting", "--project", project_id])
            .args(["--config".to_string(), config_arg])
            .arg("--non-interactive");
        if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
            spec = spec.args(["--message", message]);
        }
        if let Some(dir) = dir {
            spec = spec.current_dir(dir);
        }
        spec
    }

    /// Run `firebase deploy` and return its captured output
    ///
    /// Non-zero exit maps to `DeployError`, the wall-clock limit to `TimeoutError`.
    pub async fn deploy_hosting(
        &self,
        project_id: &str,
        config_path: &Path,
        message: Option<&str>,
        timeout: Duration,
    ) -> Result<CommandOutput, PipelineError> {
        let spec = self.deploy_command(project_id, config_path, message);

        let output = match self.runner.run(&spec, timeout).await {
            Ok(output) => output,
            Err(CommandError::Timeout { timeout, .. }) => {
                return Err(TimeoutError {
                    operation: "firebase deploy".to_string(),
                    limit: timeout,
                }
                .into())
            }
            Err(e) => {
                return Err(DeployError::Spawn {
                    message: e.to_string(),
                }
                .into())
            }
        };

        if !output.success() {
            return Err(DeployError::CommandFailed {
                code: output.code,
                stderr: output.diagnostic_tail(DIAGNOSTIC_LINES),
            }
            .into());
        }

        Ok(output)
    }

    async fn run_provisioning(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, ProvisioningError> {
        debug!("firebase: {}", spec.display());

        let output = self
            .runner
            .run(spec, timeout)
            .await
            .map_err(|e| match e {
                CommandError::NotFound { program } => ProvisioningError::ToolNotFound {
                    tool: program,
                    env_var: tools::tool_env_var(tools::names::FIREBASE),
                },
                CommandError::Timeout { timeout, .. } => ProvisioningError::TimedOut {
                    command: spec.display(),
                    limit: timeout,
                },
                CommandError::Io { source, .. } => ProvisioningError::Spawn {
                    command: spec.display(),
                    message: source.to_string(),
                },
            })?;

        if !output.success() {
            return Err(ProvisioningError::CommandFailed {
                command: spec.display(),
                code: output.code,
                stderr: output.diagnostic_tail(DIAGNOSTIC_LINES),
            });
        }

        Ok(output)
    }
}

/// Parse `projects:list --json` output
///
/// The CLI may print update notices before the JSON document, so parsing
/// starts at the first `{`.
pub fn parse_project_list(stdout: &str) -> Result<Vec<ProjectInfo>, String> {
    let start = stdout
        .find('{')
        .ok_or_else(|| "no JSON document in output".to_string())?;
    let envelope: JsonEnvelope<Vec<ProjectInfo>> =
        serde_json::from_str(&stdout[start..]).map_err(|e| e.to_string())?;

    if envelope.status != "success" {
        return Err(envelope
            .error
            .unwrap_or_else(|| format!("status '{}'", envelope.status)));
    }

    Ok(envelope.result.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a single canned outcome and records the spec it was given
    struct CannedRunner {
        outcome: Mutex<Option<Result<CommandOutput, CommandError>>>,
        seen: Mutex<Vec<CommandSpec>>,
    }

    impl CannedRunner {
        fn new(outcome: Result<CommandOutput, CommandError>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn exit(code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
            Self::new(Ok(CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                duration: Duration::ZERO,
            }))
        }
    }

    #[async_trait]
    impl CommandRunner for CannedRunner {
        async fn run(
            &self,
            spec: &CommandSpec,
            _timeout: Duration,
        ) -> Result<CommandOutput, CommandError> {
            self.seen.lock().unwrap().push(spec.clone());
            self.outcome
                .lock()
                .unwrap()
                .take()
                .expect("runner called more than once")
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_parse_project_list() {
        let stdout = r#"
{
  "status": "success",
  "result": [
    { "projectId": "ops-dashboard", "projectNumber": "1234", "displayName": "Ops Dashboard" },
    { "projectId": "other-project-1", "projectNumber": "5678" }
  ]
}"#;
        let projects = parse_project_list(stdout).unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].project_id, "ops-dashboard");
        assert_eq!(projects[0].display_name.as_deref(), Some("Ops Dashboard"));
        assert!(projects[1].display_name.is_none());
    }

    #[test]
    fn test_parse_project_list_skips_preamble() {
        let stdout = "Update available 13.0.0 → 13.1.0\n{\"status\":\"success\",\"result\":[]}";
        assert!(parse_project_list(stdout).unwrap().is_empty());
    }

    #[test]
    fn test_parse_project_list_errors() {
        assert!(parse_project_list("").is_err());
        let err =
            parse_project_list(r#"{"status":"error","error":"Failed to authenticate"}"#).unwrap_err();
        assert!(err.contains("authenticate"));
    }

    #[test]
    fn test_deploy_command_arguments() {
        let cli = FirebaseCli::with_program("firebase", CannedRunner::exit(0, "", ""));
        let spec = cli.deploy_command(
            "ops-dashboard",
            Path::new("/srv/app/firebase.json"),
            Some("release 42"),
        );
        assert_eq!(
            spec.args,
            vec![
                "deploy",
                "--only",
                "hosting",
                "--project",
                "ops-dashboard",
                "--config",
                "firebase.json",
                "--non-interactive",
                "--message",
                "release 42",
            ]
        );
        assert_eq!(spec.current_dir.as_deref(), Some(Path::new("/srv/app")));

        let bare = cli.deploy_command("ops-dashboard", Path::new("firebase.json"), Some(" "));
        assert!(!bare.args.contains(&"--message".to_string()));
        assert!(bare.current_dir.is_none());
    }

    #[tokio::test]
    async fn test_missing_cli_maps_to_tool_not_found() {
        let runner = CannedRunner::new(Err(CommandError::NotFound {
            program: "firebase".to_string(),
        }));
        let cli = FirebaseCli::with_program("firebase", runner);
        let err = cli.version(TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::ToolNotFound { .. }));
        assert!(err.to_string().contains("FIREBASE_BIN"));
    }

    #[tokio::test]
    async fn test_provisioning_timeout_keeps_limit() {
        let runner = CannedRunner::new(Err(CommandError::Timeout {
            program: "firebase".to_string(),
            timeout: Duration::from_millis(250),
        }));
        let cli = FirebaseCli::with_program("firebase", runner);
        match cli.list_projects(TIMEOUT).await.unwrap_err() {
            ProvisioningError::TimedOut { limit, .. } => {
                assert_eq!(limit, Duration::from_millis(250))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_project_failure_keeps_stderr() {
        let runner = CannedRunner::exit(1, "", "Error: Project ID is already taken\n");
        let cli = FirebaseCli::with_program("firebase", runner.clone());
        let err = cli
            .create_project("ops-dashboard", "Ops Dashboard", TIMEOUT)
            .await
            .unwrap_err();
        match err {
            ProvisioningError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("already taken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].subcommand(), Some("projects:create"));
        assert!(seen[0].args.contains(&"--non-interactive".to_string()));
    }

    #[tokio::test]
    async fn test_deploy_timeout_maps_to_timeout_error() {
        let runner = CannedRunner::new(Err(CommandError::Timeout {
            program: "firebase".to_string(),
            timeout: Duration::from_secs(600),
        }));
        let cli = FirebaseCli::with_program("firebase", runner);
        let err = cli
            .deploy_hosting("ops-dashboard", Path::new("firebase.json"), None, TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_deploy_nonzero_exit_maps_to_deploy_error() {
        let runner = CannedRunner::exit(2, "", "Error: HTTP Error: 403, permission denied\n");
        let cli = FirebaseCli::with_program("firebase", runner);
        let err = cli
            .deploy_hosting("ops-dashboard", Path::new("firebase.json"), None, TIMEOUT)
            .await
            .unwrap_err();
        match err {
            PipelineError::Deploy(DeployError::CommandFailed { code, stderr }) => {
                assert_eq!(code, Some(2));
                assert!(stderr.contains("403"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

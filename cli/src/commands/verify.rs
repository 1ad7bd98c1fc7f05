use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{load_settings, parse_duration};
use crate::infrastructure::{check_site, HttpProbe, SiteProbe};
use crate::ui::{print_header, print_success, print_warning};

/// Standalone smoke check. Unlike the Verify step of `deploy`, a failure here
/// is the command's exit status.
///
/// Without `--timeout` the limit comes from `timeouts.verify` in the
/// settings file (30s by default).
pub async fn execute(
    settings_path: &Path,
    required: bool,
    url: String,
    timeout: Option<String>,
) -> Result<()> {
    let timeout = match timeout {
        Some(ref value) => parse_duration("--timeout", value)?,
        None => {
            let loaded = load_settings(settings_path, required)?;
            parse_duration("timeouts.verify", &loaded.file.timeouts.verify)?
        }
    };
    let probe = HttpProbe::new(timeout).context("Failed to build HTTP client")?;

    print_header(&format!("Verify: {}", url));
    run(&probe, &url).await
}

async fn run(probe: &dyn SiteProbe, url: &str) -> Result<()> {
    match check_site(probe, url).await {
        Ok(status) => {
            print_success(&format!("GET {} → HTTP {}", url, status));
            Ok(())
        }
        Err(warning) => {
            print_warning(&warning.to_string());
            bail!("Verification failed for {}", url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ProbeResponse;
    use async_trait::async_trait;
    use std::fs;

    struct FixedProbe(Result<u16, String>);

    #[async_trait]
    impl SiteProbe for FixedProbe {
        async fn get(&self, _url: &str) -> Result<ProbeResponse, String> {
            self.0.clone().map(|status| ProbeResponse {
                status,
                latency_ms: 8,
            })
        }
    }

    #[tokio::test]
    async fn test_non_2xx_fails_the_command() {
        assert!(run(&FixedProbe(Ok(200)), "https://ops.web.app").await.is_ok());
        let err = run(&FixedProbe(Ok(404)), "https://ops.web.app")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("https://ops.web.app"));
        assert!(run(&FixedProbe(Err("dns error".into())), "https://ops.web.app")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_bad_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            &dir.path().join("deploy.yaml"),
            false,
            "https://ops.web.app".into(),
            Some("never".into()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("--timeout"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.yaml");
        fs::write(&path, "timeouts:\n  verify: soon\n").unwrap();

        let err = execute(&path, true, "https://ops.web.app".into(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timeouts.verify"));
    }
}

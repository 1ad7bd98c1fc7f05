//! HTTP probe for post-deploy verification

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::VerificationWarning;

/// A completed HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub latency_ms: u64,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET against a URL
#[async_trait]
pub trait SiteProbe: Send + Sync {
    /// `Err` carries a transport-level failure message (DNS, TLS, timeout...)
    async fn get(&self, url: &str) -> Result<ProbeResponse, String>;
}

/// Real probe using reqwest
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hostdeploy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SiteProbe for HttpProbe {
    async fn get(&self, url: &str) -> Result<ProbeResponse, String> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// GET `url` once; the status code on 2xx, otherwise why it did not pass
pub async fn check_site(probe: &dyn SiteProbe, url: &str) -> Result<u16, VerificationWarning> {
    let response = probe
        .get(url)
        .await
        .map_err(|message| VerificationWarning::Request {
            url: url.to_string(),
            message,
        })?;
    debug!("GET {} → {} in {}ms", url, response.status, response.latency_ms);

    if !response.is_success() {
        return Err(VerificationWarning::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(response.status)
}

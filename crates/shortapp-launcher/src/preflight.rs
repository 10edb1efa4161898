// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manifest pre-flight probe.
//
// The native launcher aborts the whole process if the manifest request does
// not return 200, so the facade issues a HEAD first and turns an unreachable
// manifest into an ordinary error.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use shortapp_core::error::{Result, ShortAppError};

/// Status line of a probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub reason: String,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The probe never got a status line back.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProbeError(pub String);

/// Existence check for a manifest URL.
#[async_trait]
pub trait ManifestProbe: Send + Sync {
    async fn head(&self, url: &str) -> std::result::Result<ProbeResponse, ProbeError>;
}

/// HEAD request over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpManifestProbe {
    client: reqwest::Client,
}

impl HttpManifestProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShortAppError::PreflightFailed(format!("HTTP client setup: {e}")))?;
        Ok(Self { client })
    }

    /// Probe over a preconfigured client (proxy, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManifestProbe for HttpManifestProbe {
    #[instrument(skip(self))]
    async fn head(&self, url: &str) -> std::result::Result<ProbeResponse, ProbeError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ProbeError(error_chain(&e)))?;
        let status = response.status();
        debug!(status = status.as_u16(), "manifest HEAD answered");
        Ok(ProbeResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}

/// `reqwest` hides the interesting part (refused, timed out) in the source
/// chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Run `probe` against `url` and map any failure to `PreflightFailed`.
pub async fn preflight(probe: &dyn ManifestProbe, url: &str) -> Result<()> {
    match probe.head(url).await {
        Ok(response) if response.is_success() => Ok(()),
        Ok(response) => Err(ShortAppError::PreflightFailed(format!(
            "Manifest unreachable: {} {}",
            response.status, response.reason
        ))),
        Err(e) => Err(ShortAppError::PreflightFailed(e.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeProbe;
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn direct_probe() -> HttpManifestProbe {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpManifestProbe::with_client(client)
    }

    /// Serve exactly one request with `status_line`, then close.
    async fn one_shot_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response =
                format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/manifest.json")
    }

    #[tokio::test]
    async fn http_probe_reports_ok() {
        let url = one_shot_server("200 OK").await;
        assert!(HttpManifestProbe::new(Duration::from_secs(5)).is_ok());
        let probe = direct_probe();
        let response = probe.head(&url).await.unwrap();
        assert!(response.is_success());
        assert!(preflight(&probe, &one_shot_server("200 OK").await).await.is_ok());
    }

    #[tokio::test]
    async fn http_probe_reports_not_found() {
        let url = one_shot_server("404 Not Found").await;
        let probe = direct_probe();
        let err = preflight(&probe, &url).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "manifest preflight failed: Manifest unreachable: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn http_probe_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = direct_probe();
        let err = preflight(&probe, &format!("http://{addr}/manifest.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShortAppError::PreflightFailed(_)));
    }

    #[tokio::test]
    async fn only_2xx_passes() {
        let probe = FakeProbe::status(204);
        assert!(preflight(&probe, "http://x/m").await.is_ok());
        let probe = FakeProbe::status(500);
        assert!(preflight(&probe, "http://x/m").await.is_err());
    }
}

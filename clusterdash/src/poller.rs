//! HTTP poller for the clusters endpoint.
//!
//! Every tick gets the next sequence number and its own fetch task, so a
//! slow response can land after a faster, newer one. Nothing is cancelled;
//! the reconciler drops whatever arrives out of order.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clusterdash_core::types::{parse_snapshots, ClusterBatch};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint answered HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("response is not a JSON array of clusters: {0}")]
    Decode(String),
}

#[derive(Debug)]
pub enum PollEvent {
    Snapshots {
        seq: u64,
        clusters: ClusterBatch,
    },
    Failed {
        seq: u64,
        error: PollError,
    },
}

impl PollEvent {
    pub fn seq(&self) -> u64 {
        match self {
            PollEvent::Snapshots { seq, .. } | PollEvent::Failed { seq, .. } => *seq,
        }
    }
}

/// Check that `raw` is an absolute http(s) URL.
pub fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid endpoint URL '{raw}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("unsupported scheme '{other}' in '{raw}' (expected http or https)"),
    }
}

pub fn build_client(timeout: Duration, tls_ca: Option<&Path>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("clusterdash/", env!("CARGO_PKG_VERSION")));
    if let Some(path) = tls_ca {
        let pem = std::fs::read(path)
            .with_context(|| format!("reading CA certificate {}", path.display()))?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .with_context(|| format!("parsing CA certificate {}", path.display()))?;
        builder = builder.add_root_certificate(cert);
    }
    builder.build().context("building HTTP client")
}

/// One GET of the clusters endpoint.
pub async fn fetch_clusters(
    client: &reqwest::Client,
    url: &Url,
) -> Result<ClusterBatch, PollError> {
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PollError::Status(status));
    }
    let body = resp.text().await?;
    parse_snapshots(&body).map_err(|e| PollError::Decode(e.to_string()))
}

/// Start polling `url` every `period`, first tick immediately. The task ends
/// once the receiver is dropped.
pub fn spawn_poller(
    client: reqwest::Client,
    url: Url,
    period: Duration,
) -> (UnboundedReceiver<PollEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(poll_loop(client, url, period, tx));
    (rx, handle)
}

async fn poll_loop(
    client: reqwest::Client,
    url: Url,
    period: Duration,
    tx: UnboundedSender<PollEvent>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq: u64 = 0;
    loop {
        ticker.tick().await;
        if tx.is_closed() {
            debug!("poll receiver gone, stopping");
            return;
        }
        seq += 1;
        let (client, url, tx) = (client.clone(), url.clone(), tx.clone());
        tokio::spawn(async move {
            let event = match fetch_clusters(&client, &url).await {
                Ok(clusters) => {
                    trace!(seq, count = clusters.len(), "poll ok");
                    PollEvent::Snapshots { seq, clusters }
                }
                Err(error) => PollEvent::Failed { seq, error },
            };
            let _ = tx.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_http() {
        assert!(parse_endpoint("http://127.0.0.1:5000/api/clusters").is_ok());
        assert!(parse_endpoint("https://dash.example/api/clusters").is_ok());
        assert!(parse_endpoint("ws://dash.example/ws").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn missing_ca_file_is_reported() {
        let err = build_client(DEFAULT_TIMEOUT, Some(Path::new("/nonexistent/ca.pem")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("ca.pem"), "{err}");
    }
}

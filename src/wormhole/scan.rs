use super::vaa::MessageId;
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

/// Client for the Wormholescan REST API.
#[derive(Clone, Debug)]
pub struct ScanClient {
    pub api: String,
    pub http: Client,
    pub poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct VaaResponse {
    data: VaaData,
}

#[derive(Debug, Deserialize)]
struct VaaData {
    vaa: String,
}

impl ScanClient {
    pub fn new(api: &str, poll_interval: Duration) -> Result<Self> {
        url::Url::parse(api).with_context(|| format!("invalid wormholescan url {api}"))?;
        Ok(Self {
            api: api.trim_end_matches('/').to_string(),
            http: Client::new(),
            poll_interval,
        })
    }

    pub fn vaa_url(&self, id: &MessageId) -> String {
        format!(
            "{}/api/v1/vaas/{}/{}/{}",
            self.api,
            id.emitter_chain,
            hex::encode(id.emitter.as_bytes()),
            id.sequence
        )
    }

    /// Fetch the signed VAA for a message, `None` while it is not yet available.
    pub async fn get_vaa(&self, id: &MessageId) -> Result<Option<Vec<u8>>> {
        let url = self.vaa_url(id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("wormholescan request failed")?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("wormholescan error status {status} for {url}");
        }
        let body: VaaResponse = response
            .json()
            .await
            .context("wormholescan decode failed")?;
        decode_vaa(&body.data.vaa).map(Some)
    }

    /// Poll until the VAA is published or `timeout` elapses.
    ///
    /// Every request and every pause between polls is bounded by the time left,
    /// so a stalled HTTP exchange cannot outlive the deadline.
    pub async fn wait_for_vaa(&self, id: &MessageId, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(attestation_timeout(id, timeout));
            }
            match tokio::time::timeout(remaining, self.get_vaa(id)).await {
                Ok(Ok(Some(vaa))) => return Ok(vaa),
                Ok(Ok(None)) => tracing::debug!(sequence = id.sequence, "vaa not signed yet"),
                Ok(Err(err)) => tracing::warn!(error = %err, "vaa lookup failed, retrying"),
                Err(_) => return Err(attestation_timeout(id, timeout)),
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

fn attestation_timeout(id: &MessageId, timeout: Duration) -> anyhow::Error {
    anyhow::anyhow!(
        "attestation not available in time (waited {}s for sequence {})",
        timeout.as_secs(),
        id.sequence
    )
}

fn decode_vaa(encoded: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(encoded.trim())
        .context("invalid base64 VAA")
}

use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Plain JSON-RPC endpoint, for calls the typed providers don't cover.
#[derive(Clone, Debug)]
pub struct JsonRpc {
    pub url: String,
    pub http: Client,
}

impl JsonRpc {
    pub fn new(url: &str) -> Result<Self> {
        url::Url::parse(url).with_context(|| format!("invalid rpc url {url}"))?;
        Ok(Self {
            url: url.to_string(),
            http: Client::new(),
        })
    }
}

pub async fn raw_rpc<T: for<'de> Deserialize<'de>>(
    client: &JsonRpc,
    method: &str,
    params: serde_json::Value,
) -> Result<T> {
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let response = client
        .http
        .post(&client.url)
        .json(&payload)
        .send()
        .await
        .context("rpc request failed")?;
    let status = response.status();
    let value: serde_json::Value = response.json().await.context("rpc decode failed")?;
    if !status.is_success() {
        anyhow::bail!("rpc error status {status}: {value}");
    }
    if let Some(error) = value.get("error") {
        anyhow::bail!("rpc error: {error}");
    }
    serde_json::from_value(value.get("result").cloned().unwrap_or_default())
        .context("rpc missing result")
}

/// Read-only EVM client.
#[derive(Clone)]
pub struct EvmClient {
    pub provider: DynProvider,
}

impl EvmClient {
    pub fn new(url: &str) -> Result<Self> {
        let parsed = url
            .parse()
            .with_context(|| format!("invalid rpc url {url}"))?;
        let provider = ProviderBuilder::new().connect_http(parsed).erased();
        Ok(Self { provider })
    }
}

pub async fn eth_call(client: &DynProvider, to: Address, data: Bytes) -> Result<Bytes> {
    let request = TransactionRequest {
        to: Some(to.into()),
        input: TransactionInput::new(data),
        ..Default::default()
    };
    Ok(client.call(request).await?)
}

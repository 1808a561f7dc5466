use crate::chain::Chain;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SCAN_API: &str = "https://api.testnet.wormholescan.io";
pub const DEFAULT_ATTESTATION_POLL_MS: u64 = 2_000;

/// Token Bridge Relayer the Wormhole testnet deploys on Sepolia.
pub const SEPOLIA_TOKEN_BRIDGE_RELAYER: &str = "0x9563a59c15842a6f322b10f69d1dd88b41f2e97b";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    pub scan: Option<ScanConfig>,
    pub chains: Option<BTreeMap<String, ChainConfig>>,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    pub api: Option<String>,
    pub attestation_poll_ms: Option<u64>,
}

/// Per-chain overrides. Unset fields fall back to the testnet defaults; an
/// empty `token_bridge_relayer` disables automatic transfers from that chain.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ChainConfig {
    pub rpc: Option<String>,
    pub token_bridge: Option<String>,
    pub core_bridge: Option<String>,
    pub token_bridge_relayer: Option<String>,
}

/// Fully resolved settings for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChain {
    pub chain: Chain,
    pub rpc: String,
    pub token_bridge: String,
    pub core_bridge: String,
    pub token_bridge_relayer: Option<String>,
    pub native_decimals: u8,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self {
                path,
                ..Self::default()
            });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.path = path;
        Ok(config)
    }

    pub fn scan_api(&self) -> String {
        self.scan
            .as_ref()
            .and_then(|scan| scan.api.clone())
            .unwrap_or_else(|| DEFAULT_SCAN_API.to_string())
    }

    pub fn attestation_poll_interval(&self) -> Duration {
        let ms = self
            .scan
            .as_ref()
            .and_then(|scan| scan.attestation_poll_ms)
            .unwrap_or(DEFAULT_ATTESTATION_POLL_MS);
        Duration::from_millis(ms)
    }

    pub fn chain(&self, chain: Chain) -> Option<&ChainConfig> {
        self.chains.as_ref()?.get(chain.name())
    }

    pub fn resolve_chain(&self, chain: Chain) -> ResolvedChain {
        let defaults = default_chain(chain);
        let Some(overrides) = self.chain(chain) else {
            return defaults;
        };
        ResolvedChain {
            chain,
            rpc: overrides.rpc.clone().unwrap_or(defaults.rpc),
            token_bridge: overrides
                .token_bridge
                .clone()
                .unwrap_or(defaults.token_bridge),
            core_bridge: overrides.core_bridge.clone().unwrap_or(defaults.core_bridge),
            token_bridge_relayer: match overrides.token_bridge_relayer.as_deref() {
                Some("") => None,
                Some(relayer) => Some(relayer.to_string()),
                None => defaults.token_bridge_relayer,
            },
            native_decimals: defaults.native_decimals,
        }
    }
}

fn default_chain(chain: Chain) -> ResolvedChain {
    match chain {
        Chain::Sepolia => ResolvedChain {
            chain,
            rpc: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            token_bridge: "0xDB5492265f6038831E89f495670FF909aDe94bd9".to_string(),
            core_bridge: "0x4a8bc80Ed5a4067f1CCf107057b8270E0cC11A78".to_string(),
            token_bridge_relayer: Some(SEPOLIA_TOKEN_BRIDGE_RELAYER.to_string()),
            native_decimals: 18,
        },
        Chain::Solana => ResolvedChain {
            chain,
            rpc: "https://api.devnet.solana.com".to_string(),
            token_bridge: "DZnkkTmCiFWfYTfT41X3Rd1kDgozqzxWaHqsw6W4x2oe".to_string(),
            core_bridge: "3u8hJUVTA4jH1wYAyUur7FFZVQ8H635K3tSHHF4ssjQ5".to_string(),
            token_bridge_relayer: None,
            native_decimals: 9,
        },
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("xchain-transfer").join("config.toml");
    }
    PathBuf::from("./config.toml")
}

use crate::chain::Chain;
use crate::config::ResolvedChain;
use crate::rpc::{raw_rpc, JsonRpc};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::Deserialize;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::signer::Signer as _;
use std::str::FromStr;

/// Byte offset of `decimals` in an SPL mint account.
const MINT_DECIMALS_OFFSET: usize = 44;

#[derive(Clone, Debug)]
pub struct SolanaChain {
    pub config: ResolvedChain,
    pub rpc: JsonRpc,
}

impl SolanaChain {
    pub fn new(config: ResolvedChain) -> Result<Self> {
        parse_pubkey(&config.token_bridge)?;
        parse_pubkey(&config.core_bridge)?;
        let rpc = JsonRpc::new(&config.rpc)?;
        Ok(Self { config, rpc })
    }

    /// Decimals of an SPL mint, read from its account data.
    pub async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8> {
        #[derive(Deserialize)]
        struct AccountInfo {
            value: Option<AccountValue>,
        }
        #[derive(Deserialize)]
        struct AccountValue {
            data: (String, String),
        }

        let info: AccountInfo = raw_rpc(
            &self.rpc,
            "getAccountInfo",
            json!([mint.to_string(), { "encoding": "base64" }]),
        )
        .await
        .with_context(|| format!("failed to fetch mint {mint}"))?;
        let value = info
            .value
            .ok_or_else(|| anyhow!("mint account {mint} not found"))?;
        let data = general_purpose::STANDARD
            .decode(&value.data.0)
            .context("invalid account data encoding")?;
        data.get(MINT_DECIMALS_OFFSET)
            .copied()
            .ok_or_else(|| anyhow!("account {mint} is not a token mint"))
    }
}

/// Keypair-backed signer for Solana.
#[derive(Debug)]
pub struct SolanaSigner {
    pub chain: Chain,
    pub keypair: Keypair,
}

impl SolanaSigner {
    pub fn from_secret(chain: &SolanaChain, rpc: &str, secret: &str) -> Result<Self> {
        let keypair = parse_secret_key(secret)?;
        tracing::debug!(pubkey = %keypair.pubkey(), %rpc, "loaded solana keypair");
        Ok(Self {
            chain: chain.config.chain,
            keypair,
        })
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

/// Parse a Solana secret key: base58 (64-byte keypair or 32-byte seed), or a
/// JSON byte array as written by `solana-keygen`.
pub fn parse_secret_key(secret: &str) -> Result<Keypair> {
    let trimmed = secret.trim();
    let bytes = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(trimmed).context("invalid solana key byte array")?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .map_err(|err| anyhow!("invalid solana private key: {err}"))?
    };

    let (seed, public) = match bytes.len() {
        64 => (&bytes[..32], Some(&bytes[32..])),
        32 => (&bytes[..], None),
        len => {
            anyhow::bail!("invalid solana private key length {len} (expected 64 or 32 bytes)")
        }
    };
    let keypair =
        keypair_from_seed(seed).map_err(|err| anyhow!("invalid solana private key: {err}"))?;
    if let Some(public) = public {
        if keypair.pubkey().as_ref() != public {
            anyhow::bail!("solana private key does not match its public half");
        }
    }
    Ok(keypair)
}

pub fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|err| anyhow!("invalid solana address {value}: {err}"))
}

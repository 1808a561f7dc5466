//! In-memory SDK used by unit tests. Records every call it receives.

use crate::chain::Chain;
use crate::sdk::{ChainContext, Interop, Signer, TokenTransfer};
use crate::types::{
    u256_to_i256, Platform, SignedTokenAmount, TokenAmount, TokenId, TransferDetails,
    TransferQuote, TransferTxIds, TxId,
};
use alloy_primitives::{I256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SEPOLIA_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const SOLANA_ADDRESS: &str = "DZnkkTmCiFWfYTfT41X3Rd1kDgozqzxWaHqsw6W4x2oe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    GetSigner(Chain, String),
    GetDecimals(TokenId),
    TokenTransfer(TransferDetails),
    Quote,
    Initiate(Chain),
    FetchAttestation(Duration),
    Complete(Chain),
}

#[derive(Debug, Clone)]
pub struct FakeContext {
    pub chain: Chain,
    pub platform: Platform,
    pub rpc: String,
    pub native_decimals: u8,
}

impl ChainContext for FakeContext {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn rpc_url(&self) -> &str {
        &self.rpc
    }

    fn native_token_decimals(&self) -> u8 {
        self.native_decimals
    }
}

#[derive(Debug, Clone)]
pub struct FakeSigner {
    pub chain: Chain,
}

impl Signer for FakeSigner {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn address(&self) -> String {
        match self.chain {
            Chain::Sepolia => SEPOLIA_ADDRESS.to_string(),
            Chain::Solana => SOLANA_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeInterop {
    pub log: Arc<Mutex<Vec<SdkCall>>>,
    pub fail_signer: Option<String>,
    pub contract_decimals: u8,
    pub quote_destination: Option<I256>,
    pub tx_ids: Option<TransferTxIds>,
    pub attestation_error: Option<String>,
}

impl FakeInterop {
    pub fn calls(&self) -> Vec<SdkCall> {
        self.log.lock().expect("call log poisoned").clone()
    }

    fn record(&self, call: SdkCall) {
        self.log.lock().expect("call log poisoned").push(call);
    }
}

pub struct FakeTransfer {
    details: TransferDetails,
    log: Arc<Mutex<Vec<SdkCall>>>,
    tx_ids: TransferTxIds,
    attestation_error: Option<String>,
}

impl FakeTransfer {
    fn record(&self, call: SdkCall) {
        self.log.lock().expect("call log poisoned").push(call);
    }
}

#[async_trait]
impl TokenTransfer for FakeTransfer {
    type Signer = FakeSigner;

    async fn initiate_transfer(&mut self, signer: &FakeSigner) -> Result<TransferTxIds> {
        self.record(SdkCall::Initiate(signer.chain));
        Ok(self.tx_ids.clone())
    }

    async fn fetch_attestation(&mut self, timeout: Duration) -> Result<()> {
        self.record(SdkCall::FetchAttestation(timeout));
        match &self.attestation_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    async fn complete_transfer(&mut self, signer: &FakeSigner) -> Result<Vec<TxId>> {
        self.record(SdkCall::Complete(signer.chain));
        Ok(vec![format!("dest-tx-{}", self.details.to.chain)])
    }
}

#[async_trait]
impl Interop for FakeInterop {
    type Context = FakeContext;
    type Signer = FakeSigner;
    type Transfer = FakeTransfer;

    fn get_chain(&self, chain: Chain) -> Result<FakeContext> {
        let native_decimals = match chain {
            Chain::Sepolia => 18,
            Chain::Solana => 9,
        };
        Ok(FakeContext {
            chain,
            platform: chain.platform(),
            rpc: format!("http://{}.invalid", chain.name().to_lowercase()),
            native_decimals,
        })
    }

    async fn get_signer(&self, context: &FakeContext, secret: &str) -> Result<FakeSigner> {
        if let Some(message) = &self.fail_signer {
            anyhow::bail!(message.clone());
        }
        self.record(SdkCall::GetSigner(context.chain, secret.to_string()));
        Ok(FakeSigner {
            chain: context.chain,
        })
    }

    async fn get_decimals(&self, token: &TokenId) -> Result<u8> {
        self.record(SdkCall::GetDecimals(*token));
        Ok(self.contract_decimals)
    }

    async fn token_transfer(&self, details: TransferDetails) -> Result<FakeTransfer> {
        self.record(SdkCall::TokenTransfer(details.clone()));
        Ok(FakeTransfer {
            details,
            log: self.log.clone(),
            tx_ids: self
                .tx_ids
                .clone()
                .unwrap_or_else(|| TransferTxIds::single("src-tx".to_string())),
            attestation_error: self.attestation_error.clone(),
        })
    }

    async fn quote_transfer(&self, transfer: &FakeTransfer) -> Result<TransferQuote> {
        self.record(SdkCall::Quote);
        let details = &transfer.details;
        let native_gas = details.native_gas.unwrap_or(U256::ZERO);
        let destination = match self.quote_destination {
            Some(amount) => amount,
            None => u256_to_i256(details.amount)? - u256_to_i256(native_gas)?,
        };
        Ok(TransferQuote {
            source_token: TokenAmount {
                token: details.token,
                amount: details.amount,
            },
            destination_token: SignedTokenAmount {
                token: details.token,
                amount: destination,
            },
            relay_fee: None,
            destination_native_gas: details.native_gas,
        })
    }
}

//! Client interface of the interoperability SDK.
//!
//! The transfer flow only talks to these traits. Chain contexts, signers and
//! transfer handles are opaque to it; [`crate::wormhole`] provides the
//! implementation used by the binary.

use crate::chain::Chain;
use crate::types::{
    ChainAddress, Platform, TokenId, TransferDetails, TransferQuote, TransferTxIds, TxId,
};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A configured blockchain context.
pub trait ChainContext: Send + Sync {
    fn chain(&self) -> Chain;

    fn platform(&self) -> Platform;

    fn rpc_url(&self) -> &str;

    /// Decimals of the chain's gas token.
    fn native_token_decimals(&self) -> u8;
}

/// A transaction signer bound to one chain.
pub trait Signer: Send + Sync {
    fn chain(&self) -> Chain;

    /// Chain-native address string of the signing account.
    fn address(&self) -> String;
}

/// An in-flight cross-chain token transfer.
#[async_trait]
pub trait TokenTransfer: Send + Sync {
    type Signer: Signer;

    /// Submit the source-chain transaction(s).
    async fn initiate_transfer(&mut self, signer: &Self::Signer) -> Result<TransferTxIds>;

    /// Wait until the transfer message has been attested, giving up after `timeout`.
    async fn fetch_attestation(&mut self, timeout: Duration) -> Result<()>;

    /// Redeem the attested transfer on the destination chain.
    async fn complete_transfer(&mut self, signer: &Self::Signer) -> Result<Vec<TxId>>;
}

/// Entry point of the SDK: chain lookup, signers, token metadata and transfers.
#[async_trait]
pub trait Interop: Send + Sync {
    type Context: ChainContext;
    type Signer: Signer;
    type Transfer: TokenTransfer<Signer = Self::Signer>;

    fn get_chain(&self, chain: Chain) -> Result<Self::Context>;

    /// Build a signer for `context` from a raw secret key.
    async fn get_signer(&self, context: &Self::Context, secret: &str) -> Result<Self::Signer>;

    /// On-chain decimals of a token.
    async fn get_decimals(&self, token: &TokenId) -> Result<u8>;

    async fn token_transfer(&self, details: TransferDetails) -> Result<Self::Transfer>;

    async fn quote_transfer(&self, transfer: &Self::Transfer) -> Result<TransferQuote>;
}

/// Qualify a signer's address with the chain it signs for.
pub fn signer_chain_address(signer: &impl Signer) -> Result<ChainAddress> {
    ChainAddress::parse(signer.chain(), &signer.address())
}

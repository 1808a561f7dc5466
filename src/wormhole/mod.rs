//! Wormhole Token Bridge implementation of the SDK traits.
//!
//! Transfers are initiated on EVM chains through the Token Bridge (manual) or
//! the Token Bridge Relayer (automatic). Attestations come from Wormholescan.
//! Redemption is supported on EVM destinations. Submitting Solana transactions
//! needs the bridge program client, so routes that would require it are
//! refused when the transfer is built, before anything is sent.

pub mod evm;
pub mod scan;
pub mod solana;
pub mod vaa;

use crate::amount::pow10;
use crate::chain::Chain;
use crate::config::Config;
use crate::sdk::{ChainContext, Interop, Signer, TokenTransfer};
use crate::types::{
    u256_to_i256, Platform, SignedTokenAmount, TokenAmount, TokenId, TransferDetails,
    TransferQuote, TransferTxIds, TxId, UniversalAddress,
};
use alloy_primitives::{Bytes, B256, U256};
use alloy_rpc_types::TransactionReceipt;
use alloy_sol_types::SolCall;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use evm::{EvmChain, EvmSigner};
use scan::ScanClient;
use solana::{SolanaChain, SolanaSigner};
use std::time::Duration;
use vaa::{MessageId, TokenTransferPayload, Vaa, PAYLOAD_TRANSFER};

/// Token Bridge amounts carry at most this many decimals.
const MAX_BRIDGE_DECIMALS: u8 = 8;

pub struct Wormhole {
    config: Config,
    scan: ScanClient,
}

impl Wormhole {
    pub fn new(config: Config) -> Result<Self> {
        let scan = ScanClient::new(&config.scan_api(), config.attestation_poll_interval())?;
        tracing::debug!(api = %scan.api, config = %config.path.display(), "wormhole sdk ready");
        Ok(Self { config, scan })
    }
}

#[derive(Clone)]
pub enum WormholeContext {
    Evm(EvmChain),
    Solana(SolanaChain),
}

impl ChainContext for WormholeContext {
    fn chain(&self) -> Chain {
        match self {
            WormholeContext::Evm(chain) => chain.config.chain,
            WormholeContext::Solana(chain) => chain.config.chain,
        }
    }

    fn platform(&self) -> Platform {
        self.chain().platform()
    }

    fn rpc_url(&self) -> &str {
        match self {
            WormholeContext::Evm(chain) => &chain.config.rpc,
            WormholeContext::Solana(chain) => &chain.config.rpc,
        }
    }

    fn native_token_decimals(&self) -> u8 {
        match self {
            WormholeContext::Evm(chain) => chain.config.native_decimals,
            WormholeContext::Solana(chain) => chain.config.native_decimals,
        }
    }
}

pub enum WormholeSigner {
    Evm(EvmSigner),
    Solana(SolanaSigner),
}

impl Signer for WormholeSigner {
    fn chain(&self) -> Chain {
        match self {
            WormholeSigner::Evm(signer) => signer.chain,
            WormholeSigner::Solana(signer) => signer.chain,
        }
    }

    fn address(&self) -> String {
        match self {
            WormholeSigner::Evm(signer) => signer.address().to_string(),
            WormholeSigner::Solana(signer) => signer.pubkey().to_string(),
        }
    }
}

pub struct WormholeTransfer {
    details: TransferDetails,
    decimals: u8,
    source: EvmChain,
    destination: WormholeContext,
    scan: ScanClient,
    message: Option<MessageId>,
    vaa: Option<Vaa>,
}

impl WormholeTransfer {
    /// Amount the bridge will actually move, after dropping sub-8-decimal dust.
    fn bridged_amount(&self) -> Result<U256> {
        truncate_dust(self.details.amount, self.decimals)
    }

    async fn initiate_from_evm(
        &mut self,
        chain: &EvmChain,
        signer: &EvmSigner,
    ) -> Result<TransferTxIds> {
        let recipient = self.details.to.address.0;
        let target = self.details.to.chain.wormhole_id();
        let amount = self.details.amount;
        let native_gas = self.details.native_gas.unwrap_or(U256::ZERO);
        let message_fee = chain.message_fee().await?;
        let automatic = self.details.automatic;

        let (txids, receipt) = match self.details.token {
            TokenId::Native(_) => {
                let (to, data) = if automatic {
                    let call = evm::wrapAndTransferEthWithRelayCall {
                        toNativeTokenAmount: native_gas,
                        targetChain: target,
                        targetRecipient: recipient,
                        batchId: 0,
                    };
                    (chain.relayer()?, call.abi_encode())
                } else {
                    let call = evm::wrapAndTransferETHCall {
                        recipientChain: target,
                        recipient,
                        arbiterFee: U256::ZERO,
                        nonce: 0,
                    };
                    (chain.token_bridge, call.abi_encode())
                };
                let receipt = signer
                    .send(to, Bytes::from(data), Some(amount + message_fee))
                    .await?;
                (TransferTxIds::single(tx_id(&receipt)), receipt)
            }
            TokenId::Contract(token) => {
                let token = token.address.to_evm()?;
                let spender = if automatic {
                    chain.relayer()?
                } else {
                    chain.token_bridge
                };
                let approval = signer.approve(token, spender, amount).await?;
                let data = if automatic {
                    evm::transferTokensWithRelayCall {
                        token,
                        amount,
                        toNativeTokenAmount: native_gas,
                        targetChain: target,
                        targetRecipient: recipient,
                        batchId: 0,
                    }
                    .abi_encode()
                } else {
                    evm::transferTokensCall {
                        token,
                        amount,
                        recipientChain: target,
                        recipient,
                        arbiterFee: U256::ZERO,
                        nonce: 0,
                    }
                    .abi_encode()
                };
                let receipt = signer
                    .send(spender, Bytes::from(data), Some(message_fee))
                    .await?;
                let txids = TransferTxIds {
                    source: tx_id(&approval),
                    bridge: Some(tx_id(&receipt)),
                };
                (txids, receipt)
            }
        };

        let emitter = UniversalAddress::from_evm(chain.token_bridge);
        let message = chain
            .published_messages(&receipt)
            .into_iter()
            .find(|message| message.emitter == emitter)
            .ok_or_else(|| {
                anyhow!(
                    "no token bridge message in transaction {}",
                    txids.bridge_or_source()
                )
            })?;
        tracing::info!(sequence = message.sequence, "wormhole message published");
        self.message = Some(message);
        Ok(txids)
    }

    async fn complete_on_evm(&self, chain: &EvmChain, signer: &EvmSigner) -> Result<Vec<TxId>> {
        let vaa = self
            .vaa
            .as_ref()
            .ok_or_else(|| anyhow!("transfer has not been attested yet"))?;
        let payload = TokenTransferPayload::parse(&vaa.payload)?;

        let weth = UniversalAddress::from_evm(chain.weth().await?);
        let encoded_vm = Bytes::from(vaa.raw.clone());
        let data = if payload.token_chain == chain.chain().wormhole_id()
            && payload.token_address == weth
        {
            evm::completeTransferAndUnwrapETHCall {
                encodedVm: encoded_vm,
            }
            .abi_encode()
        } else {
            evm::completeTransferCall {
                encodedVm: encoded_vm,
            }
            .abi_encode()
        };
        let receipt = signer
            .send(chain.token_bridge, Bytes::from(data), None)
            .await?;
        Ok(vec![tx_id(&receipt)])
    }
}

#[async_trait]
impl TokenTransfer for WormholeTransfer {
    type Signer = WormholeSigner;

    async fn initiate_transfer(&mut self, signer: &WormholeSigner) -> Result<TransferTxIds> {
        let WormholeSigner::Evm(signer) = signer else {
            anyhow::bail!(
                "signer for {} cannot initiate a transfer on {}",
                signer.chain(),
                self.details.from.chain
            );
        };
        let chain = self.source.clone();
        self.initiate_from_evm(&chain, signer).await
    }

    async fn fetch_attestation(&mut self, timeout: Duration) -> Result<()> {
        let message = self
            .message
            .ok_or_else(|| anyhow!("transfer has not been initiated"))?;
        let bytes = self.scan.wait_for_vaa(&message, timeout).await?;
        let vaa = Vaa::parse(&bytes).context("malformed VAA from wormholescan")?;
        if vaa.message_id() != message {
            anyhow::bail!("wormholescan returned a VAA for a different message");
        }
        let payload = TokenTransferPayload::parse(&vaa.payload)?;
        let expected = self.details.to.chain.wormhole_id();
        if payload.to_chain != expected {
            anyhow::bail!(
                "VAA targets chain {}, expected {expected}",
                payload.to_chain
            );
        }
        let recipient = self.details.to.address;
        if payload.payload_id == PAYLOAD_TRANSFER && payload.to != recipient {
            anyhow::bail!("VAA pays {}, expected {}", payload.to.0, recipient.0);
        }
        tracing::info!(
            sequence = vaa.sequence,
            guardian_set = vaa.guardian_set_index,
            signatures = vaa.signature_count,
            timestamp = vaa.timestamp,
            nonce = vaa.nonce,
            consistency = vaa.consistency_level,
            payload_id = payload.payload_id,
            amount = %payload.amount,
            "attestation received"
        );
        self.vaa = Some(vaa);
        Ok(())
    }

    async fn complete_transfer(&mut self, signer: &WormholeSigner) -> Result<Vec<TxId>> {
        match (&self.destination, signer) {
            (WormholeContext::Evm(chain), WormholeSigner::Evm(signer)) => {
                self.complete_on_evm(chain, signer).await
            }
            _ => anyhow::bail!(
                "signer for {} cannot complete a transfer on {}",
                signer.chain(),
                self.details.to.chain
            ),
        }
    }
}

#[async_trait]
impl Interop for Wormhole {
    type Context = WormholeContext;
    type Signer = WormholeSigner;
    type Transfer = WormholeTransfer;

    fn get_chain(&self, chain: Chain) -> Result<WormholeContext> {
        let resolved = self.config.resolve_chain(chain);
        match chain.platform() {
            Platform::Evm => Ok(WormholeContext::Evm(EvmChain::new(resolved)?)),
            Platform::Solana => Ok(WormholeContext::Solana(SolanaChain::new(resolved)?)),
            other => anyhow::bail!("Unsupported platform: {other}"),
        }
    }

    async fn get_signer(&self, context: &WormholeContext, secret: &str) -> Result<WormholeSigner> {
        match context {
            WormholeContext::Evm(chain) => Ok(WormholeSigner::Evm(
                EvmSigner::connect(chain, context.rpc_url(), secret).await?,
            )),
            WormholeContext::Solana(chain) => Ok(WormholeSigner::Solana(
                SolanaSigner::from_secret(chain, context.rpc_url(), secret)?,
            )),
        }
    }

    async fn get_decimals(&self, token: &TokenId) -> Result<u8> {
        let address = match token {
            TokenId::Native(chain) => return Ok(self.get_chain(*chain)?.native_token_decimals()),
            TokenId::Contract(address) => address,
        };
        match self.get_chain(address.chain)? {
            WormholeContext::Evm(chain) => chain.erc20_decimals(address.address.to_evm()?).await,
            WormholeContext::Solana(chain) => {
                chain.mint_decimals(&address.address.to_solana()).await
            }
        }
    }

    async fn token_transfer(&self, details: TransferDetails) -> Result<WormholeTransfer> {
        if details.native_gas.is_some() && !details.automatic {
            anyhow::bail!("native gas can only be requested for automatic transfers");
        }
        if details.token.chain() != details.from.chain {
            anyhow::bail!(
                "token {} does not live on source chain {}",
                details.token,
                details.from.chain
            );
        }
        if details.from.chain == details.to.chain {
            anyhow::bail!("source and destination chain must differ");
        }

        let WormholeContext::Evm(source) = self.get_chain(details.from.chain)? else {
            anyhow::bail!(
                "transfers from {} are not supported: sending Solana transactions needs \
                 the token bridge program client",
                details.from.chain
            );
        };
        let destination = self.get_chain(details.to.chain)?;
        if !details.automatic && destination.platform() == Platform::Solana {
            anyhow::bail!(
                "manual transfers to {} are not supported: redeeming on Solana needs the \
                 token bridge program client; use --automatic",
                details.to.chain
            );
        }
        if details.automatic {
            source.relayer()?;
        }
        let decimals = self.get_decimals(&details.token).await?;
        tracing::debug!(
            token = %details.token,
            decimals,
            automatic = details.automatic,
            "transfer built"
        );

        Ok(WormholeTransfer {
            details,
            decimals,
            source,
            destination,
            scan: self.scan.clone(),
            message: None,
            vaa: None,
        })
    }

    async fn quote_transfer(&self, transfer: &WormholeTransfer) -> Result<TransferQuote> {
        let details = &transfer.details;
        let bridged = transfer.bridged_amount()?;

        let relay_fee = if details.automatic {
            let chain = &transfer.source;
            let token = match details.token {
                TokenId::Native(_) => chain.weth().await?,
                TokenId::Contract(token) => token.address.to_evm()?,
            };
            let fee = chain
                .relayer_fee(details.to.chain.wormhole_id(), token, transfer.decimals)
                .await?;
            Some(fee)
        } else {
            None
        };

        let native_gas = details.native_gas.unwrap_or(U256::ZERO);
        let destination = u256_to_i256(bridged)?
            - u256_to_i256(relay_fee.unwrap_or(U256::ZERO))?
            - u256_to_i256(native_gas)?;

        Ok(TransferQuote {
            source_token: TokenAmount {
                token: details.token,
                amount: details.amount,
            },
            destination_token: SignedTokenAmount {
                token: details.token,
                amount: destination,
            },
            relay_fee: relay_fee.map(|amount| TokenAmount {
                token: details.token,
                amount,
            }),
            destination_native_gas: details.native_gas,
        })
    }
}

/// Drop the precision the Token Bridge cannot carry.
pub fn truncate_dust(amount: U256, decimals: u8) -> Result<U256> {
    if decimals <= MAX_BRIDGE_DECIMALS {
        return Ok(amount);
    }
    let scale = pow10(u32::from(decimals - MAX_BRIDGE_DECIMALS))?;
    Ok(amount / scale * scale)
}

fn tx_id(receipt: &TransactionReceipt) -> TxId {
    format!("{:#x}", receipt.transaction_hash)
}

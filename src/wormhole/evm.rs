use super::vaa::MessageId;
use crate::chain::Chain;
use crate::config::ResolvedChain;
use crate::rpc::{eth_call, EvmClient};
use crate::types::{parse_address, UniversalAddress};
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{Log, TransactionInput, TransactionReceipt, TransactionRequest};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use anyhow::{anyhow, Context, Result};

alloy_sol_types::sol! {
    // Token Bridge
    function wrapAndTransferETH(uint16 recipientChain, bytes32 recipient, uint256 arbiterFee, uint32 nonce) payable returns (uint64 sequence);
    function transferTokens(address token, uint256 amount, uint16 recipientChain, bytes32 recipient, uint256 arbiterFee, uint32 nonce) payable returns (uint64 sequence);
    function completeTransfer(bytes encodedVm);
    function completeTransferAndUnwrapETH(bytes encodedVm);
    function WETH() view returns (address);

    // Core bridge
    function messageFee() view returns (uint256);
    event LogMessagePublished(address indexed sender, uint64 sequence, uint32 nonce, bytes payload, uint8 consistencyLevel);

    // Token Bridge Relayer
    function calculateRelayerFee(uint16 targetChainId, address token, uint8 decimals) view returns (uint256 feeInTokenDenomination);
    function wrapAndTransferEthWithRelay(uint256 toNativeTokenAmount, uint16 targetChain, bytes32 targetRecipient, uint32 batchId) payable returns (uint64 messageSequence);
    function transferTokensWithRelay(address token, uint256 amount, uint256 toNativeTokenAmount, uint16 targetChain, bytes32 targetRecipient, uint32 batchId) payable returns (uint64 messageSequence);

    // ERC20
    function approve(address spender, uint256 value) returns (bool);
    function decimals() view returns (uint8);
}

/// EVM chain id served by the RPC of a Wormhole chain.
pub fn evm_chain_id(chain: Chain) -> Option<u64> {
    match chain {
        Chain::Sepolia => Some(11_155_111),
        Chain::Solana => None,
    }
}

#[derive(Clone)]
pub struct EvmChain {
    pub config: ResolvedChain,
    pub token_bridge: Address,
    pub core_bridge: Address,
    pub relayer: Option<Address>,
    pub client: EvmClient,
}

impl EvmChain {
    pub fn new(config: ResolvedChain) -> Result<Self> {
        let token_bridge = parse_address(&config.token_bridge)?;
        let core_bridge = parse_address(&config.core_bridge)?;
        let relayer = config
            .token_bridge_relayer
            .as_deref()
            .map(parse_address)
            .transpose()?;
        let client = EvmClient::new(&config.rpc)?;
        Ok(Self {
            config,
            token_bridge,
            core_bridge,
            relayer,
            client,
        })
    }

    pub fn chain(&self) -> Chain {
        self.config.chain
    }

    pub fn relayer(&self) -> Result<Address> {
        self.relayer.ok_or_else(|| {
            anyhow!(
                "automatic transfers from {chain} need chains.{chain}.token_bridge_relayer in the config",
                chain = self.chain()
            )
        })
    }

    /// Wrapped native token the Token Bridge uses for this chain's gas token.
    pub async fn weth(&self) -> Result<Address> {
        let data = Bytes::from(WETHCall {}.abi_encode());
        let result = eth_call(&self.client.provider, self.token_bridge, data)
            .await
            .context("failed to read WETH from token bridge")?;
        let value: (Address,) = <(Address,)>::abi_decode(result.as_ref())?;
        Ok(value.0)
    }

    pub async fn message_fee(&self) -> Result<U256> {
        let data = Bytes::from(messageFeeCall {}.abi_encode());
        let result = eth_call(&self.client.provider, self.core_bridge, data)
            .await
            .context("failed to read core bridge message fee")?;
        let value: (U256,) = <(U256,)>::abi_decode(result.as_ref())?;
        Ok(value.0)
    }

    pub async fn erc20_decimals(&self, token: Address) -> Result<u8> {
        let data = Bytes::from(decimalsCall {}.abi_encode());
        let result = eth_call(&self.client.provider, token, data)
            .await
            .with_context(|| format!("failed to read decimals of {token}"))?;
        let value: (U256,) = <(U256,)>::abi_decode(result.as_ref())?;
        u8::try_from(value.0).map_err(|_| anyhow!("decimals out of range for {token}"))
    }

    pub async fn relayer_fee(&self, target_chain: u16, token: Address, decimals: u8) -> Result<U256> {
        let call = calculateRelayerFeeCall {
            targetChainId: target_chain,
            token,
            decimals,
        };
        let data = Bytes::from(call.abi_encode());
        let result = eth_call(&self.client.provider, self.relayer()?, data)
            .await
            .context("failed to quote relayer fee")?;
        let value: (U256,) = <(U256,)>::abi_decode(result.as_ref())?;
        Ok(value.0)
    }

    /// Wormhole messages the core bridge published in a receipt.
    pub fn published_messages(&self, receipt: &TransactionReceipt) -> Vec<MessageId> {
        self.messages_from_logs(receipt.logs())
    }

    fn messages_from_logs(&self, logs: &[Log]) -> Vec<MessageId> {
        logs.iter()
            .filter(|log| {
                log.address() == self.core_bridge
                    && log.topics().first() == Some(&LogMessagePublished::SIGNATURE_HASH)
            })
            .filter_map(|log| LogMessagePublished::decode_log_data(log.data()).ok())
            .map(|event| MessageId {
                emitter_chain: self.chain().wormhole_id(),
                emitter: UniversalAddress::from_evm(event.sender),
                sequence: event.sequence,
            })
            .collect()
    }
}

/// Local private-key signer plus a wallet-enabled provider for its chain.
pub struct EvmSigner {
    pub chain: Chain,
    pub signer: PrivateKeySigner,
    pub provider: DynProvider,
}

impl EvmSigner {
    /// Connect a wallet provider for `chain` through `rpc`, refusing an
    /// endpoint that serves a different network.
    pub async fn connect(chain: &EvmChain, rpc: &str, secret: &str) -> Result<Self> {
        let signer = load_wallet(secret)?;
        let url: reqwest::Url = rpc
            .parse()
            .with_context(|| format!("invalid rpc url {rpc}"))?;
        let reader = ProviderBuilder::new().connect_http(url.clone());
        let chain_id = reader
            .get_chain_id()
            .await
            .with_context(|| format!("failed to fetch chain id from {rpc}"))?;
        if let Some(expected) = evm_chain_id(chain.chain()) {
            if chain_id != expected {
                anyhow::bail!(
                    "rpc {rpc} serves chain id {chain_id}, expected {expected} for {}",
                    chain.chain()
                );
            }
        }

        let signer = signer.with_chain_id(Some(chain_id));
        let provider = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect_http(url)
            .erased();
        Ok(Self {
            chain: chain.chain(),
            signer,
            provider,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Send a transaction and wait for a successful receipt.
    pub async fn send(&self, to: Address, data: Bytes, value: Option<U256>) -> Result<TransactionReceipt> {
        let request = TransactionRequest {
            to: Some(to.into()),
            input: TransactionInput::new(data),
            value,
            ..Default::default()
        };
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .with_context(|| format!("failed to submit transaction to {to}"))?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(chain = %self.chain, tx = %tx_hash, "transaction submitted");
        let receipt = pending
            .get_receipt()
            .await
            .with_context(|| format!("failed to fetch receipt for {tx_hash:#x}"))?;
        if !receipt.status() {
            anyhow::bail!("transaction {tx_hash:#x} reverted");
        }
        Ok(receipt)
    }

    pub async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TransactionReceipt> {
        let call = approveCall {
            spender,
            value: amount,
        };
        self.send(token, Bytes::from(call.abi_encode()), None).await
    }
}

pub fn load_wallet(key: &str) -> Result<PrivateKeySigner> {
    let pk_signer: PrivateKeySigner = key
        .trim()
        .parse()
        .map_err(|err| anyhow!("invalid private key: {err}"))?;
    Ok(pk_signer)
}

use crate::chain::Chain;
use alloy_primitives::{Address, B256, I256, U256};
use anyhow::{anyhow, Result};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Transfer parameters exactly as they were given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_chain: String,
    pub dest_chain: String,
    pub amount: String,
    pub automatic: bool,
    pub native_gas: Option<String>,
    pub token: Option<String>,
}

/// Platform family a chain belongs to. Only EVM and Solana chains are wired
/// up; the other families are reported as unsupported.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Evm,
    Solana,
    Cosmwasm,
    Sui,
    Aptos,
    Algorand,
    Near,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Evm => "Evm",
            Platform::Solana => "Solana",
            Platform::Cosmwasm => "Cosmwasm",
            Platform::Sui => "Sui",
            Platform::Aptos => "Aptos",
            Platform::Algorand => "Algorand",
            Platform::Near => "Near",
        };
        f.write_str(name)
    }
}

/// 32-byte chain-agnostic address, as carried in Wormhole payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniversalAddress(pub B256);

impl UniversalAddress {
    pub fn from_evm(address: Address) -> Self {
        Self(address.into_word())
    }

    pub fn from_solana(pubkey: &Pubkey) -> Self {
        Self(B256::from(pubkey.to_bytes()))
    }

    pub fn to_evm(&self) -> Result<Address> {
        if self.0[..12].iter().any(|byte| *byte != 0) {
            anyhow::bail!("universal address {} is not an EVM address", self.0);
        }
        Ok(Address::from_word(self.0))
    }

    pub fn to_solana(&self) -> Pubkey {
        Pubkey::new_from_array(self.0 .0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

/// An address qualified by the chain it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainAddress {
    pub chain: Chain,
    pub address: UniversalAddress,
}

impl ChainAddress {
    pub fn new(chain: Chain, address: UniversalAddress) -> Self {
        Self { chain, address }
    }

    /// Parse a chain-native address string (0x hex for EVM, base58 for Solana).
    pub fn parse(chain: Chain, value: &str) -> Result<Self> {
        let address = match chain.platform() {
            Platform::Evm => UniversalAddress::from_evm(parse_address(value)?),
            Platform::Solana => {
                let pubkey = Pubkey::from_str(value)
                    .map_err(|err| anyhow!("invalid solana address {value}: {err}"))?;
                UniversalAddress::from_solana(&pubkey)
            }
            other => anyhow::bail!("Unsupported platform: {other}"),
        };
        Ok(Self { chain, address })
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain.platform() {
            Platform::Evm => write!(f, "{}", Address::from_word(self.address.0)),
            Platform::Solana => write!(f, "{}", self.address.to_solana()),
            _ => write!(f, "{:#x}", self.address.0),
        }
    }
}

/// Token identifier: either the chain's gas token or a token contract/mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    Native(Chain),
    Contract(ChainAddress),
}

impl TokenId {
    pub fn native(chain: Chain) -> Self {
        TokenId::Native(chain)
    }

    pub fn chain(&self) -> Chain {
        match self {
            TokenId::Native(chain) => *chain,
            TokenId::Contract(address) => address.chain,
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Native(chain) => write!(f, "{chain}:native"),
            TokenId::Contract(address) => write!(f, "{}:{address}", address.chain),
        }
    }
}

/// Everything the SDK needs to build a token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDetails {
    pub token: TokenId,
    pub amount: U256,
    pub from: ChainAddress,
    pub to: ChainAddress,
    pub automatic: bool,
    pub native_gas: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: TokenId,
    pub amount: U256,
}

/// Destination amounts are signed: fees and native gas can exceed the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTokenAmount {
    pub token: TokenId,
    pub amount: I256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuote {
    pub source_token: TokenAmount,
    pub destination_token: SignedTokenAmount,
    pub relay_fee: Option<TokenAmount>,
    pub destination_native_gas: Option<U256>,
}

pub type TxId = String;

/// Transaction ids produced by initiating a transfer.
///
/// `bridge` is the transaction that emitted the Wormhole message when it differs
/// from the first transaction submitted on the source chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTxIds {
    pub source: TxId,
    pub bridge: Option<TxId>,
}

impl TransferTxIds {
    pub fn single(source: TxId) -> Self {
        Self {
            source,
            bridge: None,
        }
    }

    pub fn bridge_or_source(&self) -> &str {
        self.bridge.as_deref().unwrap_or(&self.source)
    }
}

pub fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value).map_err(|err| anyhow!("invalid address {value}: {err}"))
}

pub fn u256_to_i256(value: U256) -> Result<I256> {
    I256::try_from(value).map_err(|_| anyhow!("amount overflow: {value}"))
}

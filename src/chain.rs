use crate::types::Platform;
use anyhow::Result;
use std::fmt;

pub const SUPPORTED_CHAINS: [&str; 2] = ["Sepolia", "Solana"];

const CHAIN_ALIASES: [(&str, &str); 5] = [
    ("Ethereum", "Sepolia"),
    ("ETH", "Sepolia"),
    ("Sepolia", "Sepolia"),
    ("Solana", "Solana"),
    ("SOL", "Solana"),
];

pub const INVALID_CHAIN_MESSAGE: &str = "Invalid chain specified. Supported: Sepolia, Solana";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    Sepolia,
    Solana,
}

impl Chain {
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Sepolia => "Sepolia",
            Chain::Solana => "Solana",
        }
    }

    /// Wormhole chain id.
    pub fn wormhole_id(&self) -> u16 {
        match self {
            Chain::Sepolia => 10002,
            Chain::Solana => 1,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            Chain::Sepolia => Platform::Evm,
            Chain::Solana => Platform::Solana,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Sepolia" => Some(Chain::Sepolia),
            "Solana" => Some(Chain::Solana),
            _ => None,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a user-supplied chain name to its canonical spelling.
///
/// Aliases match case-insensitively, so `eth`, `ETH` and `Ethereum` all give
/// `Sepolia`. Anything else is capitalized (first letter upper, rest lower)
/// and returned as-is; it may still be unsupported.
pub fn normalize_chain_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((_, canonical)) = CHAIN_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
    {
        return canonical.to_string();
    }
    capitalize(trimmed)
}

pub fn is_supported_chain(name: &str) -> bool {
    SUPPORTED_CHAINS.contains(&name)
}

/// Normalize and validate a chain name in one step.
pub fn resolve_chain(raw: &str) -> Result<Chain> {
    let name = normalize_chain_name(raw);
    if !is_supported_chain(&name) {
        anyhow::bail!(INVALID_CHAIN_MESSAGE);
    }
    Chain::from_name(&name).ok_or_else(|| anyhow::anyhow!(INVALID_CHAIN_MESSAGE))
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

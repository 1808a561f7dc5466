use crate::types::TransferRequest;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "xchain-transfer",
    version,
    about = "Send native tokens between Sepolia and Solana over Wormhole"
)]
pub struct Cli {
    /// Chain to send from (Sepolia, Ethereum, ETH, Solana, SOL)
    pub source_chain: String,

    /// Chain to receive on
    pub dest_chain: String,

    /// Amount in whole tokens, e.g. 0.01
    #[arg(allow_negative_numbers = true)]
    pub amount: String,

    /// Let a relayer complete the transfer on the destination chain
    #[arg(long)]
    pub automatic: bool,

    /// Native gas to receive on the destination chain (automatic transfers only)
    #[arg(long, value_name = "AMOUNT")]
    pub native_gas: Option<String>,

    /// Token contract on the source chain to send instead of the native token
    #[arg(long, value_name = "ADDRESS")]
    pub token: Option<String>,

    /// Config file (defaults to <config dir>/xchain-transfer/config.toml)
    #[arg(long)]
    pub config_path: Option<PathBuf>,
}

impl Cli {
    pub fn into_request(self) -> TransferRequest {
        TransferRequest {
            source_chain: self.source_chain,
            dest_chain: self.dest_chain,
            amount: self.amount,
            automatic: self.automatic,
            native_gas: self.native_gas,
            token: self.token,
        }
    }
}

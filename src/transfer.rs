use crate::amount::{format_units, parse_units};
use crate::chain::Chain;
use crate::sdk::{ChainContext, Interop, TokenTransfer};
use crate::signer::{get_signer, Credentials, SignerBundle};
use crate::types::{ChainAddress, TokenId, TransferDetails, TransferRequest, TransferTxIds, TxId};
use alloy_primitives::{I256, U256};
use anyhow::Result;
use std::io::Write;
use std::time::Duration;

pub const ATTESTATION_TIMEOUT: Duration = Duration::from_millis(120_000);

pub const AMOUNT_TOO_LOW_MESSAGE: &str = "Amount too low to cover fees and requested native gas";

/// Both sides of a transfer, ready to sign.
pub struct TransferSetup<S: Interop> {
    pub source: SignerBundle<S>,
    pub destination: SignerBundle<S>,
    pub token: TokenId,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub source_txids: TransferTxIds,
    pub destination_txids: Option<Vec<TxId>>,
}

/// Resolve chain contexts and signers for both sides. Without a token
/// address the source chain's native token is sent.
pub async fn setup_transfer<S: Interop>(
    sdk: &S,
    source_chain: Chain,
    dest_chain: Chain,
    credentials: &Credentials,
    token: Option<&str>,
    out: &mut impl Write,
) -> Result<TransferSetup<S>> {
    let send_chain = sdk.get_chain(source_chain)?;
    let rcv_chain = sdk.get_chain(dest_chain)?;

    let source = get_signer(sdk, send_chain, credentials).await?;
    let destination = get_signer(sdk, rcv_chain, credentials).await?;

    let token = match token {
        Some(address) => {
            let token = TokenId::Contract(ChainAddress::parse(source_chain, address)?);
            writeln!(out, "Using token: {token}")?;
            token
        }
        None => {
            let token = TokenId::native(source_chain);
            writeln!(out, "Using native token: {token}")?;
            token
        }
    };

    Ok(TransferSetup {
        source,
        destination,
        token,
    })
}

/// Decimals used to scale amounts of `token`.
///
/// Contract tokens are looked up on-chain; the native token uses the chain's
/// configured decimals.
pub async fn token_decimals<S: Interop>(
    sdk: &S,
    token: &TokenId,
    send_chain: &S::Context,
) -> Result<u8> {
    match token {
        TokenId::Contract(_) => sdk.get_decimals(token).await,
        TokenId::Native(_) => Ok(send_chain.native_token_decimals()),
    }
}

/// Quote, initiate and (for manual transfers) attest and redeem.
pub async fn execute_transfer<S: Interop>(
    sdk: &S,
    request: &TransferRequest,
    setup: &TransferSetup<S>,
    out: &mut impl Write,
) -> Result<TransferOutcome> {
    let TransferSetup {
        source,
        destination,
        token,
    } = setup;

    let decimals = token_decimals(sdk, token, &source.chain).await?;
    let amount = parse_units(&request.amount, decimals)?;
    let native_gas = request
        .native_gas
        .as_deref()
        .map(|value| parse_units(value, decimals))
        .transpose()?;
    tracing::debug!(%amount, ?native_gas, decimals, "scaled transfer amounts");

    let mut xfer = sdk
        .token_transfer(TransferDetails {
            token: *token,
            amount,
            from: source.address,
            to: destination.address,
            automatic: request.automatic,
            native_gas,
        })
        .await?;

    let quote = sdk.quote_transfer(&xfer).await?;
    tracing::info!(
        destination_amount = %quote.destination_token.amount,
        relay_fee = ?quote.relay_fee.as_ref().map(|fee| fee.amount),
        native_gas = ?quote.destination_native_gas,
        "transfer quoted"
    );
    if request.automatic && quote.destination_token.amount.is_negative() {
        anyhow::bail!(AMOUNT_TOO_LOW_MESSAGE);
    }
    print_quote(
        out,
        &quote.source_token.amount,
        &quote.destination_token.amount,
        decimals,
    )?;

    writeln!(out, "\nInitiating transfer...")?;
    let source_txids = xfer.initiate_transfer(&source.signer).await?;
    writeln!(out, "Source TX: {}", source_txids.source)?;
    writeln!(out, "Wormhole TX: {}", source_txids.bridge_or_source())?;

    if request.automatic {
        return Ok(TransferOutcome {
            source_txids,
            destination_txids: None,
        });
    }

    writeln!(out, "\nWaiting for attestation...")?;
    xfer.fetch_attestation(ATTESTATION_TIMEOUT).await?;

    writeln!(out, "Completing transfer...")?;
    let destination_txids = xfer.complete_transfer(&destination.signer).await?;
    writeln!(out, "Destination TX: {}", destination_txids.join(", "))?;

    Ok(TransferOutcome {
        source_txids,
        destination_txids: Some(destination_txids),
    })
}

fn print_quote(out: &mut impl Write, source: &U256, destination: &I256, decimals: u8) -> Result<()> {
    let destination = if destination.is_negative() {
        format!("-{}", format_units(destination.unsigned_abs(), decimals))
    } else {
        format_units(destination.unsigned_abs(), decimals)
    };
    writeln!(
        out,
        "Quote: send {} -> receive {destination}",
        format_units(*source, decimals)
    )?;
    Ok(())
}

mod amount;
mod chain;
mod cli;
mod config;
mod rpc;
mod sdk;
mod signer;
#[cfg(test)]
mod testing;
mod transfer;
mod types;
mod wormhole;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }
    init_logging();
    tracing::debug!("logger initialized");

    match run(cli).await {
        Ok(()) => {
            println!("\nTransfer completed successfully!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "transfer failed");
            eprintln!("\nTransfer failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli) -> Result<()> {
    let config_path = cli.config_path.clone();
    let request = cli.into_request();

    let source_chain = chain::resolve_chain(&request.source_chain)?;
    let dest_chain = chain::resolve_chain(&request.dest_chain)?;
    tracing::info!(%source_chain, %dest_chain, amount = %request.amount, "transfer requested");

    let config = config::Config::load(config_path.as_deref())?;
    let credentials = signer::Credentials::from_env();
    let sdk = wormhole::Wormhole::new(config)?;

    let mut out = std::io::stdout();
    let setup = transfer::setup_transfer(
        &sdk,
        source_chain,
        dest_chain,
        &credentials,
        request.token.as_deref(),
        &mut out,
    )
    .await?;
    let outcome = transfer::execute_transfer(&sdk, &request, &setup, &mut out).await?;
    tracing::debug!(?outcome, "transfer finished");
    Ok(())
}

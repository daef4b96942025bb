use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fanout_dispatch::Address;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

mod commands;
mod config;
mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "fanout")]
#[command(about = "Batch dispatch of signed value transfers to an EVM endpoint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in networks and their endpoints
    Networks,

    /// Read sender and recipient CSVs, confirm, and dispatch the batch
    Send {
        /// Built-in network to target (see `fanout networks`)
        #[arg(short, long, conflicts_with_all = ["rpc_url", "chain_id"])]
        network: Option<String>,

        /// Custom JSON-RPC endpoint URL (pairs with --chain-id)
        #[arg(long, requires = "chain_id")]
        rpc_url: Option<Url>,

        /// Chain id the custom endpoint serves (pairs with --rpc-url)
        #[arg(long, requires = "rpc_url")]
        chain_id: Option<u64>,

        /// ERC-20 contract address; omit to send the native asset
        #[arg(short, long)]
        token: Option<Address>,

        /// Senders CSV file (secret_key,amount)
        #[arg(long, default_value = "senders.csv")]
        senders: PathBuf,

        /// Recipients CSV file (address,amount)
        #[arg(long, default_value = "recipients.csv")]
        recipients: PathBuf,

        /// Upper bound on jobs in flight at once
        #[arg(long, default_value = "4")]
        max_parallel: usize,

        /// Where to write the per-job results log
        #[arg(short, long, default_value = "results.csv")]
        out: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Networks => commands::networks::execute(),
        Commands::Send {
            network,
            rpc_url,
            chain_id,
            token,
            senders,
            recipients,
            max_parallel,
            out,
            yes,
        } => {
            commands::send::execute(
                network,
                rpc_url,
                chain_id,
                token,
                senders,
                recipients,
                max_parallel,
                out,
                yes,
            )
            .await
        }
    }
}

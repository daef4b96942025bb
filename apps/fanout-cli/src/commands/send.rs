use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fanout_csvs::{
    pair_transfers, read_recipients_csv, read_senders_csv, write_results_csv, AmountCell,
    PairedTransfer, ResultRow,
};
use fanout_dispatch::{
    Address, AmountSpec, AssetKind, DispatchConfig, DispatchPool, HttpEndpoint, JobResult,
    ProgressSink, TransferJob, U256,
};
use rust_decimal::Decimal;
use url::Url;

use crate::config::find_network;
use crate::error::{CliError, CliResult};

/// Decimals used for the chain's base currency (wei per unit)
const NATIVE_DECIMALS: u8 = 18;

/// Fallback when a token contract does not answer metadata queries
const DEFAULT_TOKEN_DECIMALS: u8 = 18;

pub async fn execute(
    network: Option<String>,
    rpc_url: Option<Url>,
    chain_id: Option<u64>,
    token: Option<Address>,
    senders: PathBuf,
    recipients: PathBuf,
    max_parallel: usize,
    out: PathBuf,
    yes: bool,
) -> CliResult<()> {
    // Step 1: Resolve the target endpoint
    let (network_label, url, chain_id) = resolve_endpoint(network, rpc_url, chain_id)?;
    let endpoint = Arc::new(HttpEndpoint::connect(url.clone(), chain_id));

    // Step 2: Load and pair the input files
    let sender_rows = read_senders_csv(&senders)?;
    let recipient_rows = read_recipients_csv(&recipients)?;
    let transfers = pair_transfers(&sender_rows, &recipient_rows)?;
    println!(
        "📋 Loaded {} sender(s) and {} recipient(s): {} transfer job(s)",
        sender_rows.len(),
        recipient_rows.len(),
        transfers.len()
    );

    // Step 3: Resolve the asset and how many decimals its amounts carry
    let (asset, asset_label, decimals) = resolve_asset(&endpoint, token).await;

    // Step 4: Convert human amounts into smallest units and build jobs
    let jobs = build_jobs(transfers, asset, decimals)?;
    let job_count = jobs.len();

    // Step 5: Validate the dispatch settings before anything reaches the wire
    let config = DispatchConfig {
        max_parallel,
        ..Default::default()
    };
    config.validate()?;

    // Step 6: Show the plan and ask for a final go-ahead
    print_summary(
        &network_label,
        &url,
        chain_id,
        &asset_label,
        job_count,
        max_parallel,
        &out,
    );
    if !yes && !confirm()? {
        println!("Aborted; nothing was sent.");
        return Ok(());
    }

    // Step 7: Dispatch the batch
    let progress = Arc::new(PrintSink::new(job_count));
    let pool = DispatchPool::with_config(endpoint, config).with_progress(progress);
    let results = pool.run(jobs).await?;

    // Step 8: Persist the results log and summarize
    let rows = to_result_rows(&results);
    write_results_csv(&out, &rows)?;

    let sent = results.iter().filter(|result| result.ok).count();
    let failed = results.len() - sent;
    println!("\n🎉 Dispatch complete: {} sent, {} failed", sent, failed);
    println!("📄 Results written to {}", out.display());

    // Per-job failures are recorded in the results log, not in the exit code
    Ok(())
}

fn resolve_endpoint(
    network: Option<String>,
    rpc_url: Option<Url>,
    chain_id: Option<u64>,
) -> CliResult<(String, Url, u64)> {
    if let Some(name) = network {
        let info = find_network(&name).ok_or_else(|| {
            CliError::InvalidConfig(format!("unknown network '{}'; see `fanout networks`", name))
        })?;
        let url = info.endpoint_url.parse::<Url>().map_err(|e| {
            CliError::InvalidConfig(format!(
                "bad catalog URL for '{}': {}",
                info.friendly_name, e
            ))
        })?;
        return Ok((info.friendly_name.to_string(), url, info.chain_id));
    }

    match (rpc_url, chain_id) {
        (Some(url), Some(id)) => Ok(("custom".to_string(), url, id)),
        _ => Err(CliError::InvalidConfig(
            "choose --network <name>, or give both --rpc-url and --chain-id".to_string(),
        )),
    }
}

/// Decide what is being sent and how its amounts are scaled.
///
/// Token metadata comes from the contract itself; when the contract does not
/// answer, fall back to 18 decimals and keep going.
async fn resolve_asset(
    endpoint: &HttpEndpoint,
    token: Option<Address>,
) -> (AssetKind, String, u8) {
    let Some(contract) = token else {
        return (
            AssetKind::Native,
            "native asset".to_string(),
            NATIVE_DECIMALS,
        );
    };

    match endpoint.token_metadata(contract).await {
        Ok(metadata) => {
            let label = if metadata.symbol.is_empty() {
                format!("token {}", contract)
            } else {
                format!("{} ({})", metadata.symbol, contract)
            };
            (AssetKind::Token(contract), label, metadata.decimals)
        }
        Err(e) => {
            println!(
                "⚠️  Could not read token metadata ({}); assuming {} decimals",
                e, DEFAULT_TOKEN_DECIMALS
            );
            (
                AssetKind::Token(contract),
                format!("token {}", contract),
                DEFAULT_TOKEN_DECIMALS,
            )
        }
    }
}

fn build_jobs(
    transfers: Vec<PairedTransfer>,
    asset: AssetKind,
    decimals: u8,
) -> CliResult<Vec<TransferJob>> {
    let mut jobs = Vec::with_capacity(transfers.len());

    for transfer in transfers {
        let amount = match transfer.amount {
            AmountCell::All => {
                if matches!(asset, AssetKind::Token(_)) {
                    return Err(CliError::InvalidConfig(
                        "'all' amounts require the native asset".to_string(),
                    ));
                }
                AmountSpec::EntireBalance
            }
            AmountCell::Value(value) => AmountSpec::Fixed(to_smallest_units(value, decimals)?),
            // pair_transfers never lets an unspecified amount through
            AmountCell::Unspecified => {
                return Err(CliError::InvalidAmount(
                    "transfer has no amount after pairing".to_string(),
                ));
            }
        };
        jobs.push(TransferJob::new(
            transfer.secret_key,
            transfer.recipient,
            asset,
            amount,
        ));
    }

    Ok(jobs)
}

/// Scale a human-readable amount into the asset's smallest units.
///
/// The conversion is exact: digits beyond the asset's decimals are an error,
/// not a rounding.
fn to_smallest_units(amount: Decimal, decimals: u8) -> CliResult<U256> {
    let amount = amount.normalize();
    let scale = amount.scale();
    if scale > u32::from(decimals) {
        return Err(CliError::InvalidAmount(format!(
            "'{}' has more fractional digits than the asset's {} decimals",
            amount, decimals
        )));
    }

    let mantissa = u128::try_from(amount.mantissa())
        .map_err(|_| CliError::InvalidAmount(format!("'{}' is negative", amount)))?;
    let factor = U256::from(10u64).pow(U256::from(u32::from(decimals) - scale));
    Ok(U256::from(mantissa) * factor)
}

fn print_summary(
    network: &str,
    url: &Url,
    chain_id: u64,
    asset: &str,
    job_count: usize,
    max_parallel: usize,
    out: &Path,
) {
    println!("\n📊 Dispatch plan:");
    println!("  Network:      {} ({})", network, url);
    println!("  Chain id:     {}", chain_id);
    println!("  Asset:        {}", asset);
    println!("  Jobs:         {}", job_count);
    println!("  Max parallel: {}", max_parallel);
    println!("  Results file: {}", out.display());
}

fn confirm() -> CliResult<bool> {
    println!("\n⚠️  This will sign and submit live transactions.");
    print!("Type 'yes' to dispatch: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

fn to_result_rows(results: &[JobResult]) -> Vec<ResultRow> {
    results
        .iter()
        .map(|result| ResultRow {
            ok: result.ok,
            from: result.from,
            to: result.to,
            tx_hash: result.tx_hash,
            error: result.error.clone().unwrap_or_default(),
        })
        .collect()
}

/// Prints one line per finished job as the pool reports them
struct PrintSink {
    total: usize,
    completed: AtomicUsize,
}

impl PrintSink {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for PrintSink {
    fn job_completed(&self, result: &JobResult) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let marker = if result.ok { "✅" } else { "❌" };
        println!(
            "{} [{}/{}] {} -> {}",
            marker, done, self.total, result.from, result.to
        );
    }
}

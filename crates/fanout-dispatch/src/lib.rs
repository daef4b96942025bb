/*!
# Fanout Dispatch

Batch dispatch of signed value transfers to an EVM ledger endpoint, with
bounded concurrency, automatic retry with fee escalation, and
send-entire-balance support.

## Quick Start

```rust
use fanout_dispatch::{
    AmountSpec, AssetKind, DispatchPool, HttpEndpoint, PrivateKeySigner, TransferJob, U256,
};
use std::sync::Arc;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let endpoint = Arc::new(HttpEndpoint::connect("https://rpc.example.org".parse()?, 1));

let job = TransferJob::new(
    PrivateKeySigner::random(),
    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse()?,
    AssetKind::Native,
    AmountSpec::Fixed(U256::from(1_000_000_000_000_000u64)),
);

// Handles concurrency limits, retries, and fee escalation automatically
let pool = DispatchPool::new(endpoint);
let results = pool.run(vec![job]).await?;
for result in &results {
    println!("{} -> {}: ok={}", result.from, result.to, result.ok);
}
# Ok(())
# }
```

## Custom Configuration

```rust
# use fanout_dispatch::{DispatchConfig, DispatchPool, HttpEndpoint};
# use std::sync::Arc;
# use std::time::Duration;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let endpoint = Arc::new(HttpEndpoint::connect("https://rpc.example.org".parse()?, 1));
let config = DispatchConfig {
    max_parallel: 8,
    max_retries: 6,
    backoff_interval: Duration::from_millis(500),
    ..Default::default()
};

let pool = DispatchPool::with_config(endpoint, config);
# Ok(())
# }
```

## Sweeping an Account

```rust
# use fanout_dispatch::{AmountSpec, AssetKind, PrivateKeySigner, TransferJob};

# fn example() -> Result<(), Box<dyn std::error::Error>> {
// Entire-balance mode reserves fees and sends the rest; native asset only
let sweep = TransferJob::new(
    PrivateKeySigner::random(),
    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse()?,
    AssetKind::Native,
    AmountSpec::EntireBalance,
);
# let _ = sweep;
# Ok(())
# }
```
*/

mod allocator;
mod config;
mod endpoint;
mod error;
mod fees;
mod intent;
mod job;
mod pool;
mod progress;
mod sender;

pub use allocator::BalanceAllocator;
pub use config::{DispatchConfig, MAX_PARALLEL_JOBS, MIN_PARALLEL_JOBS};
pub use endpoint::{Endpoint, EndpointError, EndpointResult, HttpEndpoint, TokenMetadata, ERC20};
pub use error::{DispatchError, DispatchResult};
pub use fees::{FeeOracle, FeeQuote};
pub use intent::TransactionIntent;
pub use job::{AmountSpec, AssetKind, JobResult, TransferJob};
pub use pool::DispatchPool;
pub use progress::{NullSink, ProgressSink};
pub use sender::{AttemptOutcome, RejectionClass, RetryableSender};

// Re-export key Alloy types for convenience
pub use alloy::primitives::{Address, Bytes, B256, U256};
pub use alloy::signers::local::PrivateKeySigner;

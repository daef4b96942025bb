use std::sync::Arc;

use fanout_dispatch::{AmountSpec, AssetKind, DispatchPool, Endpoint, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint};

fn native_job(n: u8) -> TransferJob {
    TransferJob::new(
        test_signer(n),
        test_recipient(n),
        AssetKind::Native,
        AmountSpec::Fixed(U256::from(100u64)),
    )
}

/// Gas estimates get headroom; failed estimates fall back to the default
#[tokio::test]
async fn test_dispatch_gas_headroom_applied() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    endpoint.set_gas_estimate(20_000);

    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(vec![native_job(1)]).await.unwrap();

    assert!(results[0].ok);
    // 20_000 plus the default 10 percent headroom
    assert_eq!(endpoint.submissions()[0].gas_limit, 22_000);
}

#[tokio::test]
async fn test_dispatch_gas_fallback_on_estimate_failure() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    endpoint.fail_gas_estimates(true);

    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(vec![native_job(1)]).await.unwrap();

    assert!(results[0].ok, "estimation failure is not fatal: {:?}", results[0].error);
    // The configured fallback goes out as-is, without headroom
    assert_eq!(endpoint.submissions()[0].gas_limit, 21_000);
}

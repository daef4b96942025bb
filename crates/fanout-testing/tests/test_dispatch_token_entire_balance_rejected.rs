use std::sync::Arc;

use fanout_dispatch::{Address, AmountSpec, AssetKind, DispatchPool, Endpoint, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint};

/// Entire-balance mode is a native-asset feature
///
/// This test validates the guard on token sweeps:
/// - A token job asking for the entire balance fails without submitting
/// - A sibling native job in the same batch is unaffected
#[tokio::test]
async fn test_dispatch_token_entire_balance_rejected() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    let contract = Address::repeat_byte(0xAA);

    let jobs = vec![
        TransferJob::new(
            test_signer(1),
            test_recipient(1),
            AssetKind::Token(contract),
            AmountSpec::EntireBalance,
        ),
        TransferJob::new(
            test_signer(2),
            test_recipient(2),
            AssetKind::Native,
            AmountSpec::Fixed(U256::from(100u64)),
        ),
    ];

    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(jobs).await.unwrap();

    assert!(!results[0].ok);
    assert!(results[0]
        .error
        .as_deref()
        .unwrap()
        .contains("native asset"));

    assert!(results[1].ok, "sibling unaffected: {:?}", results[1].error);

    // Only the native job reached the wire
    assert_eq!(endpoint.submission_count(), 1);
    assert_eq!(endpoint.submissions()[0].to, test_recipient(2));
}

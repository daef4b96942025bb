use std::sync::Arc;

use fanout_dispatch::{AmountSpec, AssetKind, DispatchPool, Endpoint, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint};

/// Failed fee queries abort the attempt but stay recoverable
///
/// This test validates populate-side failure handling:
/// - Two failed fee reads burn two attempts without reaching the wire
/// - The third attempt populates normally and succeeds
/// - Populate failures never escalate the eventual quote
#[tokio::test]
async fn test_dispatch_query_failure_recovery() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    endpoint.fail_next_fee_quotes(2);

    let job = TransferJob::new(
        test_signer(1),
        test_recipient(1),
        AssetKind::Native,
        AmountSpec::Fixed(U256::from(100u64)),
    );
    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(vec![job]).await.unwrap();

    assert!(results[0].ok, "query failures should heal: {:?}", results[0].error);

    let submissions = endpoint.submissions();
    assert_eq!(submissions.len(), 1, "aborted attempts never reach the wire");
    assert_eq!(submissions[0].max_fee_per_gas, 100, "no escalation happened");
    assert_eq!(submissions[0].nonce, 0);
}

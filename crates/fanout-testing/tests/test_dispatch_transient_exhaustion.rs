use std::sync::Arc;

use fanout_dispatch::{AmountSpec, AssetKind, DispatchPool, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint, SubmitOutcome};

/// Every attempt times out until the budget is gone
///
/// This test validates the retry ceiling on transient rejections:
/// - Exactly five attempts go out (one initial try plus four retries)
/// - Transient remediation never touches fees or the sequence number
/// - The recorded error carries the last rejection text
#[tokio::test]
async fn test_dispatch_transient_exhaustion() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    endpoint.set_default_outcome(SubmitOutcome::Reject("request timeout".to_string()));

    let job = TransferJob::new(
        test_signer(1),
        test_recipient(1),
        AssetKind::Native,
        AmountSpec::Fixed(U256::from(1_000u64)),
    );
    let pool = DispatchPool::with_config(Arc::clone(&endpoint), fast_config());
    let results = pool.run(vec![job]).await.unwrap();

    assert!(!results[0].ok);
    assert!(results[0].tx_hash.is_none());
    let error = results[0].error.as_deref().unwrap();
    assert!(error.contains("after 5 attempts"), "unexpected error: {}", error);
    assert!(error.contains("timeout"), "unexpected error: {}", error);

    let submissions = endpoint.submissions();
    assert_eq!(submissions.len(), 5, "budget is five total attempts");
    for submission in &submissions {
        assert_eq!(submission.nonce, submissions[0].nonce);
        assert_eq!(submission.max_fee_per_gas, 100, "transient retries keep the quote");
        assert_eq!(submission.max_priority_fee_per_gas, Some(10));
    }
}

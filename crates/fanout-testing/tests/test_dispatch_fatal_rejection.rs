use std::sync::Arc;

use fanout_dispatch::{AmountSpec, AssetKind, DispatchPool, Endpoint, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint, SubmitOutcome};

/// An unrecognized rejection stops the job on the first attempt
///
/// This test validates fatal classification:
/// - A rejection outside both marker tables is never retried
/// - The job fails with the rejection text after exactly one submission
#[tokio::test]
async fn test_dispatch_fatal_rejection() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    let recipient = test_recipient(3);
    endpoint.script_submissions(
        recipient,
        vec![SubmitOutcome::Reject(
            "execution reverted: transfer amount exceeds balance".to_string(),
        )],
    );

    let job = TransferJob::new(
        test_signer(1),
        recipient,
        AssetKind::Native,
        AmountSpec::Fixed(U256::from(1_000u64)),
    );
    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(vec![job]).await.unwrap();

    assert!(!results[0].ok);
    let error = results[0].error.as_deref().unwrap();
    assert!(error.contains("execution reverted"), "unexpected error: {}", error);

    // The script's next outcome would have been an accept; a retry would show up here
    assert_eq!(endpoint.submission_count(), 1, "fatal rejections stop immediately");
}

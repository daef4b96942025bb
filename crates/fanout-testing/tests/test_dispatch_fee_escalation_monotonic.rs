use std::sync::Arc;

use fanout_dispatch::{AmountSpec, AssetKind, DispatchPool, Endpoint, TransferJob, U256};
use fanout_testing::{fast_config, test_recipient, test_signer, ScriptedEndpoint, SubmitOutcome};

/// Four underpriced rejections, then an accept on the final attempt
///
/// This test validates fee escalation across remediation rounds:
/// - Round n multiplies the fresh quote by (1 + n), so the offered fees
///   grow strictly: 100, 200, 300, 400, 500
/// - Both EIP-1559 fields escalate in step
/// - The job still succeeds once the offer clears
#[tokio::test]
async fn test_dispatch_fee_escalation_monotonic() {
    let endpoint = Arc::new(ScriptedEndpoint::new());
    let recipient = test_recipient(7);

    let mut outcomes =
        vec![SubmitOutcome::Reject("replacement transaction underpriced".to_string()); 4];
    outcomes.push(SubmitOutcome::Accept);
    endpoint.script_submissions(recipient, outcomes);

    let job = TransferJob::new(
        test_signer(1),
        recipient,
        AssetKind::Native,
        AmountSpec::Fixed(U256::from(1_000u64)),
    );
    let pool =
        DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, fast_config());
    let results = pool.run(vec![job]).await.unwrap();

    assert!(results[0].ok, "final attempt should clear: {:?}", results[0].error);

    let submissions = endpoint.submissions();
    assert_eq!(submissions.len(), 5);

    let max_fees: Vec<u128> = submissions.iter().map(|s| s.max_fee_per_gas).collect();
    let priority_fees: Vec<u128> = submissions
        .iter()
        .map(|s| s.max_priority_fee_per_gas.unwrap())
        .collect();
    assert_eq!(max_fees, vec![100, 200, 300, 400, 500]);
    assert_eq!(priority_fees, vec![10, 20, 30, 40, 50]);

    for pair in submissions.windows(2) {
        assert!(
            pair[1].max_fee_per_gas > pair[0].max_fee_per_gas,
            "escalation must be strictly increasing"
        );
    }
}

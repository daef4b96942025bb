use std::sync::Arc;

use alloy::primitives::B256;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::allocator::BalanceAllocator;
use crate::config::DispatchConfig;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult};
use crate::intent::TransactionIntent;
use crate::job::{AmountSpec, AssetKind, JobResult, TransferJob};
use crate::progress::{NullSink, ProgressSink};
use crate::sender::RetryableSender;

/// Bounded-concurrency scheduler for a batch of transfer jobs
///
/// Every job is visited exactly once and produces exactly one result;
/// individual failures are recorded and never abort the batch or touch
/// sibling jobs.
pub struct DispatchPool {
    endpoint: Arc<dyn Endpoint>,
    config: DispatchConfig,
    progress: Arc<dyn ProgressSink>,
}

impl DispatchPool {
    /// Create a pool with the default configuration
    pub fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self::with_config(endpoint, DispatchConfig::default())
    }

    /// Create a pool with a custom configuration
    pub fn with_config(endpoint: Arc<dyn Endpoint>, config: DispatchConfig) -> Self {
        Self {
            endpoint,
            config,
            progress: Arc::new(NullSink),
        }
    }

    /// Attach a sink notified once per completed job
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every job to completion and return one result per job
    ///
    /// Jobs are admitted as slots free up, never more than `max_parallel`
    /// in flight. The call returns only after all jobs have settled; the
    /// only error it returns itself is a configuration problem detected
    /// before any job starts.
    pub async fn run(&self, jobs: Vec<TransferJob>) -> DispatchResult<Vec<JobResult>> {
        self.config.validate()?;
        info!(
            "dispatching {} transfer jobs, at most {} in flight",
            jobs.len(),
            self.config.max_parallel
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel));
        let mut identities = Vec::with_capacity(jobs.len());
        let mut handles = Vec::with_capacity(jobs.len());

        for job in jobs {
            let from = job.sender();
            let to = job.recipient;
            identities.push((from, to));

            let semaphore = Arc::clone(&semaphore);
            let endpoint = Arc::clone(&self.endpoint);
            let config = self.config.clone();
            let progress = Arc::clone(&self.progress);

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return JobResult::failure(
                            from,
                            to,
                            "dispatch pool closed before job start".to_string(),
                        );
                    }
                };

                let result = match execute_job(endpoint, &config, job).await {
                    Ok(hash) => JobResult::success(from, to, hash),
                    Err(e) => JobResult::failure(from, to, e.to_string()),
                };
                progress.job_completed(&result);
                result
            }));
        }

        let outcomes = join_all(handles).await;
        let mut results = Vec::with_capacity(outcomes.len());
        for ((from, to), outcome) in identities.into_iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("job task for {} -> {} aborted: {}", from, to, e);
                    results.push(JobResult::failure(from, to, format!("job task aborted: {}", e)));
                }
            }
        }

        let failed = results.iter().filter(|r| !r.ok).count();
        info!(
            "dispatch finished: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );
        Ok(results)
    }
}

/// Resolve the amount, build the intent, and drive the attempt loop
async fn execute_job(
    endpoint: Arc<dyn Endpoint>,
    config: &DispatchConfig,
    job: TransferJob,
) -> DispatchResult<B256> {
    let from = job.sender();

    let amount = match job.amount {
        AmountSpec::Fixed(value) => value,
        AmountSpec::EntireBalance => match job.asset {
            AssetKind::Native => {
                BalanceAllocator::new(Arc::clone(&endpoint), config.clone())
                    .resolve_send_all(from, job.recipient)
                    .await?
            }
            AssetKind::Token(_) => {
                return Err(DispatchError::Config(
                    "entire-balance mode requires the native asset".to_string(),
                ))
            }
        },
    };

    let mut intent = TransactionIntent::for_transfer(&job, amount, endpoint.chain_id());
    let sender = RetryableSender::new(endpoint, config.clone());
    sender.send(&job.signer, &mut intent).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointError, EndpointResult};
    use crate::fees::FeeQuote;
    use alloy::primitives::{Address, Bytes, U256};
    use alloy::signers::local::PrivateKeySigner;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct RejectingEndpoint {
        submissions: AtomicUsize,
    }

    impl RejectingEndpoint {
        fn new() -> Self {
            Self {
                submissions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Endpoint for RejectingEndpoint {
        fn chain_id(&self) -> u64 {
            31337
        }

        async fn native_balance(&self, _address: Address) -> EndpointResult<U256> {
            Ok(U256::from(1_000_000u64))
        }

        async fn transaction_count(&self, _address: Address) -> EndpointResult<u64> {
            Ok(0)
        }

        async fn estimate_gas(
            &self,
            _from: Address,
            _to: Address,
            _value: U256,
            _input: &Bytes,
        ) -> EndpointResult<u64> {
            Ok(21_000)
        }

        async fn fee_quote(&self) -> EndpointResult<FeeQuote> {
            Ok(FeeQuote::Legacy { gas_price: 1 })
        }

        async fn send_raw(&self, _raw: Bytes) -> EndpointResult<B256> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            Err(EndpointError::Rejected("execution reverted".to_string()))
        }
    }

    fn native_job() -> TransferJob {
        TransferJob::new(
            PrivateKeySigner::random(),
            Address::repeat_byte(0x42),
            AssetKind::Native,
            AmountSpec::Fixed(U256::from(100u64)),
        )
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let pool = DispatchPool::new(Arc::new(RejectingEndpoint::new()));
        let results = pool.run(vec![]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_bound_rejected_before_dispatch() {
        let endpoint = Arc::new(RejectingEndpoint::new());
        let config = DispatchConfig {
            max_parallel: 0,
            ..Default::default()
        };
        let pool =
            DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, config);

        let err = pool.run(vec![native_job()]).await.unwrap_err();
        assert!(matches!(err, DispatchError::Config(_)));
        assert_eq!(endpoint.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_recorded_not_propagated() {
        let endpoint = Arc::new(RejectingEndpoint::new());
        let config = DispatchConfig {
            backoff_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let pool =
            DispatchPool::with_config(Arc::clone(&endpoint) as Arc<dyn Endpoint>, config);

        let results = pool.run(vec![native_job(), native_job()]).await.unwrap();
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(!result.ok);
            assert!(result.error.as_deref().unwrap().contains("execution reverted"));
        }
        // fatal rejections stop each job after a single attempt
        assert_eq!(endpoint.submissions.load(Ordering::SeqCst), 2);
    }
}

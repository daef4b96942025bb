use std::sync::Arc;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult};
use crate::fees::FeeOracle;
use crate::intent::TransactionIntent;

/// Rejection classes that warrant another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionClass {
    /// Stale sequence number or an uncompetitive fee offer; remediated by
    /// refreshing both before the next attempt
    SequencePricing,
    /// Endpoint hiccup; the next attempt is made unchanged after a wait
    Transient,
}

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted(B256),
    RecoverableRejection {
        class: RejectionClass,
        message: String,
    },
    FatalRejection(String),
}

/// Rejection texts that indicate a sequence race or an underpriced offer.
/// Checked before the transient markers; the first matching class wins.
const SEQUENCE_PRICING_MARKERS: &[&str] = &[
    "nonce too low",
    "replacement transaction",
    "underpriced",
    "already known",
];

/// Rejection texts worth retrying without mutating the intent
const TRANSIENT_MARKERS: &[&str] = &["timeout", "network", "rate limit", "failed"];

/// Classify a rejection message into its failure class
///
/// Matching is case-insensitive on substrings. Anything outside both marker
/// tables cannot be fixed by retrying and is treated as fatal.
pub fn classify_rejection(message: &str) -> AttemptOutcome {
    let lowered = message.to_lowercase();
    if SEQUENCE_PRICING_MARKERS.iter().any(|m| lowered.contains(m)) {
        AttemptOutcome::RecoverableRejection {
            class: RejectionClass::SequencePricing,
            message: message.to_string(),
        }
    } else if TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m)) {
        AttemptOutcome::RecoverableRejection {
            class: RejectionClass::Transient,
            message: message.to_string(),
        }
    } else {
        AttemptOutcome::FatalRejection(message.to_string())
    }
}

/// Drives the attempt loop for one transaction intent
///
/// Bounded by `max_retries` extra attempts after the initial try. Sequence
/// and pricing rejections escalate fees and refresh the sequence number
/// before waiting; transient rejections only wait. Waits grow linearly with
/// the attempt number.
pub struct RetryableSender {
    endpoint: Arc<dyn Endpoint>,
    oracle: FeeOracle,
    config: DispatchConfig,
}

impl RetryableSender {
    pub fn new(endpoint: Arc<dyn Endpoint>, config: DispatchConfig) -> Self {
        let oracle = FeeOracle::new(Arc::clone(&endpoint));
        Self {
            endpoint,
            oracle,
            config,
        }
    }

    /// Submit the intent on behalf of `signer`, retrying through recoverable
    /// rejections until the attempt budget runs out
    pub async fn send(
        &self,
        signer: &PrivateKeySigner,
        intent: &mut TransactionIntent,
    ) -> DispatchResult<B256> {
        let from = signer.address();
        let mut attempt: u32 = 1;

        loop {
            match self.attempt_once(signer, intent).await? {
                AttemptOutcome::Accepted(hash) => {
                    debug!("transfer from {} accepted on attempt {}: {}", from, attempt, hash);
                    return Ok(hash);
                }
                AttemptOutcome::RecoverableRejection { class, message } => {
                    if attempt > self.config.max_retries {
                        return Err(DispatchError::SendFailed {
                            attempts: attempt,
                            last_error: message,
                        });
                    }
                    warn!(
                        "attempt {} from {} rejected ({:?}): {}",
                        attempt, from, class, message
                    );
                    if class == RejectionClass::SequencePricing {
                        self.remediate(from, intent, attempt).await;
                    }
                    sleep(self.config.backoff_interval * attempt).await;
                    attempt += 1;
                }
                AttemptOutcome::FatalRejection(message) => {
                    warn!("attempt {} from {} fatally rejected: {}", attempt, from, message);
                    return Err(DispatchError::SendFailed {
                        attempts: attempt,
                        last_error: message,
                    });
                }
            }
        }
    }

    /// One populate, sign, submit round
    async fn attempt_once(
        &self,
        signer: &PrivateKeySigner,
        intent: &mut TransactionIntent,
    ) -> DispatchResult<AttemptOutcome> {
        match self.populate(signer.address(), intent).await {
            Ok(()) => {}
            // A failed default read aborts the attempt but stays recoverable
            Err(DispatchError::QueryFailed(e)) => {
                return Ok(AttemptOutcome::RecoverableRejection {
                    class: RejectionClass::Transient,
                    message: e.to_string(),
                });
            }
            Err(other) => return Err(other),
        }

        let raw = intent.sign(signer)?;
        match self.endpoint.send_raw(raw).await {
            Ok(hash) => Ok(AttemptOutcome::Accepted(hash)),
            Err(e) => Ok(classify_rejection(&e.to_string())),
        }
    }

    /// Fill intent fields that have not been set yet from endpoint defaults
    async fn populate(
        &self,
        from: Address,
        intent: &mut TransactionIntent,
    ) -> DispatchResult<()> {
        if intent.gas_limit.is_none() {
            let units = match self
                .endpoint
                .estimate_gas(from, intent.to, intent.value, &intent.input)
                .await
            {
                Ok(units) => self.config.apply_headroom(units),
                Err(e) => {
                    debug!("gas estimation failed, using fallback limit: {}", e);
                    self.config.fallback_gas_limit
                }
            };
            intent.gas_limit = Some(units);
        }

        if intent.fees.is_none() {
            intent.fees = Some(self.oracle.current_fees().await?);
        }

        if intent.sequence.is_none() {
            intent.sequence = Some(self.oracle.next_sequence(from).await?);
        }

        Ok(())
    }

    /// Refresh fees and sequence after a sequence/pricing rejection
    ///
    /// Fees are re-quoted and scaled by (1 + attempt); when the re-quote
    /// fails the previous quote is scaled instead, so escalation stays
    /// monotonic. A failed sequence refresh keeps the previous number.
    async fn remediate(&self, from: Address, intent: &mut TransactionIntent, attempt: u32) {
        let base = match self.oracle.current_fees().await {
            Ok(fresh) => Some(fresh),
            Err(e) => {
                warn!("fee re-query failed, escalating previous quote: {}", e);
                intent.fees
            }
        };
        if let Some(quote) = base {
            intent.fees = Some(quote.scaled(1 + u128::from(attempt)));
        }

        match self.oracle.next_sequence(from).await {
            Ok(sequence) => intent.sequence = Some(sequence),
            Err(e) => warn!("sequence refresh failed, keeping previous: {}", e),
        }
    }
}

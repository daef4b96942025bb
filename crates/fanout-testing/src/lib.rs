use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportErrorKind;
use async_trait::async_trait;

use fanout_dispatch::{
    DispatchConfig, Endpoint, EndpointError, EndpointResult, FeeQuote, JobResult, ProgressSink,
};

/// Chain id served by every scripted endpoint
pub const TEST_CHAIN_ID: u64 = 31337;

/// Deterministic signer for tests; `n` selects the key
pub fn test_signer(n: u8) -> PrivateKeySigner {
    assert!(n > 0, "zero is not a valid secret key");
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    PrivateKeySigner::from_bytes(&B256::from(bytes)).expect("valid secret key")
}

/// Deterministic recipient address for tests
pub fn test_recipient(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Dispatch config tuned for fast test runs
pub fn fast_config() -> DispatchConfig {
    DispatchConfig {
        backoff_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

/// Scripted response for one submission
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accept,
    Reject(String),
}

/// One decoded submission the scripted endpoint received
#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    /// None for legacy transactions
    pub max_priority_fee_per_gas: Option<u128>,
}

struct ScriptState {
    balances: HashMap<Address, U256>,
    sequences: HashMap<Address, VecDeque<u64>>,
    fee_quote: FeeQuote,
    failing_fee_quotes: u32,
    gas_estimate: u64,
    failing_gas_estimates: bool,
    scripts: HashMap<Address, VecDeque<SubmitOutcome>>,
    default_outcome: SubmitOutcome,
    submit_delay: Duration,
    submissions: Vec<SubmittedTx>,
}

/// In-memory endpoint serving scripted per-submission outcomes
///
/// Submissions are decoded back into their signed fields and recorded, so
/// tests can assert on the exact nonces, fees, and calldata that went out.
/// Outcome scripts are keyed by the transaction's call target; submissions
/// with no script fall back to the default outcome (accept).
pub struct ScriptedEndpoint {
    chain_id: u64,
    state: Mutex<ScriptState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self {
            chain_id: TEST_CHAIN_ID,
            state: Mutex::new(ScriptState {
                balances: HashMap::new(),
                sequences: HashMap::new(),
                fee_quote: FeeQuote::Eip1559 {
                    max_fee_per_gas: 100,
                    max_priority_fee_per_gas: 10,
                },
                failing_fee_quotes: 0,
                gas_estimate: 21_000,
                failing_gas_estimates: false,
                scripts: HashMap::new(),
                default_outcome: SubmitOutcome::Accept,
                submit_delay: Duration::ZERO,
                submissions: Vec::new(),
            }),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the native balance served for an address
    pub fn fund(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    /// Script the sequence numbers served for an address, in order;
    /// the last value keeps being served once reached
    pub fn script_sequences(&self, address: Address, values: Vec<u64>) {
        self.state
            .lock()
            .unwrap()
            .sequences
            .insert(address, values.into());
    }

    pub fn set_fee_quote(&self, quote: FeeQuote) {
        self.state.lock().unwrap().fee_quote = quote;
    }

    /// Make the next `n` fee queries fail with a transport error
    pub fn fail_next_fee_quotes(&self, n: u32) {
        self.state.lock().unwrap().failing_fee_quotes = n;
    }

    pub fn set_gas_estimate(&self, units: u64) {
        self.state.lock().unwrap().gas_estimate = units;
    }

    /// Make every gas estimation fail with a transport error
    pub fn fail_gas_estimates(&self, failing: bool) {
        self.state.lock().unwrap().failing_gas_estimates = failing;
    }

    /// Script the outcomes for submissions targeting `to`, in order;
    /// once the script runs out the default outcome applies
    pub fn script_submissions(&self, to: Address, outcomes: Vec<SubmitOutcome>) {
        self.state.lock().unwrap().scripts.insert(to, outcomes.into());
    }

    pub fn set_default_outcome(&self, outcome: SubmitOutcome) {
        self.state.lock().unwrap().default_outcome = outcome;
    }

    /// Hold each submission open for `delay` before answering, so tests
    /// can observe how many run concurrently
    pub fn set_submit_delay(&self, delay: Duration) {
        self.state.lock().unwrap().submit_delay = delay;
    }

    /// Every submission received so far, in arrival order
    pub fn submissions(&self) -> Vec<SubmittedTx> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }

    /// Highest number of submissions that were in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Endpoint for ScriptedEndpoint {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn native_balance(&self, address: Address) -> EndpointResult<U256> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn transaction_count(&self, address: Address) -> EndpointResult<u64> {
        let mut state = self.state.lock().unwrap();
        let sequence = match state.sequences.get_mut(&address) {
            Some(values) if values.len() > 1 => values.pop_front().unwrap_or(0),
            Some(values) => values.front().copied().unwrap_or(0),
            None => 0,
        };
        Ok(sequence)
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Address,
        _value: U256,
        _input: &Bytes,
    ) -> EndpointResult<u64> {
        let state = self.state.lock().unwrap();
        if state.failing_gas_estimates {
            return Err(transport_failure("scripted gas estimation failure"));
        }
        Ok(state.gas_estimate)
    }

    async fn fee_quote(&self) -> EndpointResult<FeeQuote> {
        let mut state = self.state.lock().unwrap();
        if state.failing_fee_quotes > 0 {
            state.failing_fee_quotes -= 1;
            return Err(transport_failure("scripted fee query failure"));
        }
        Ok(state.fee_quote)
    }

    async fn send_raw(&self, raw: Bytes) -> EndpointResult<B256> {
        let decoded = decode_submission(&raw);
        let (outcome, count, delay) = {
            let mut state = self.state.lock().unwrap();
            state.submissions.push(decoded.clone());
            let outcome = match state.scripts.get_mut(&decoded.to) {
                Some(script) if !script.is_empty() => script.pop_front().unwrap(),
                _ => state.default_outcome.clone(),
            };
            (outcome, state.submissions.len(), state.submit_delay)
        };

        let level = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(level, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            SubmitOutcome::Accept => Ok(B256::from(U256::from(count as u64))),
            SubmitOutcome::Reject(message) => Err(EndpointError::Rejected(message)),
        }
    }
}

fn transport_failure(context: &str) -> EndpointError {
    EndpointError::Rpc(TransportErrorKind::custom_str(context))
}

fn decode_submission(raw: &Bytes) -> SubmittedTx {
    let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
        .expect("submitted bytes decode as a signed transaction");
    match envelope {
        TxEnvelope::Eip1559(signed) => {
            let tx = signed.tx();
            SubmittedTx {
                to: call_target(tx.to),
                value: tx.value,
                input: tx.input.clone(),
                nonce: tx.nonce,
                gas_limit: tx.gas_limit,
                max_fee_per_gas: tx.max_fee_per_gas,
                max_priority_fee_per_gas: Some(tx.max_priority_fee_per_gas),
            }
        }
        TxEnvelope::Legacy(signed) => {
            let tx = signed.tx();
            SubmittedTx {
                to: call_target(tx.to),
                value: tx.value,
                input: tx.input.clone(),
                nonce: tx.nonce,
                gas_limit: tx.gas_limit,
                max_fee_per_gas: tx.gas_price,
                max_priority_fee_per_gas: None,
            }
        }
        other => panic!("unexpected transaction envelope: {:?}", other),
    }
}

fn call_target(kind: TxKind) -> Address {
    match kind {
        TxKind::Call(address) => address,
        TxKind::Create => panic!("transfers never deploy code"),
    }
}

/// Progress sink counting terminal job transitions
#[derive(Default)]
pub struct CountingSink {
    completed: AtomicUsize,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CountingSink {
    fn job_completed(&self, _result: &JobResult) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

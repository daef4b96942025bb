use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use tracing::debug;

use crate::config::DispatchConfig;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult};
use crate::fees::FeeOracle;

/// Computes the largest native amount a sender can part with
///
/// Reserves the estimated settlement cost out of the current balance so the
/// transfer itself stays payable.
pub struct BalanceAllocator {
    endpoint: Arc<dyn Endpoint>,
    oracle: FeeOracle,
    config: DispatchConfig,
}

impl BalanceAllocator {
    pub fn new(endpoint: Arc<dyn Endpoint>, config: DispatchConfig) -> Self {
        let oracle = FeeOracle::new(Arc::clone(&endpoint));
        Self {
            endpoint,
            oracle,
            config,
        }
    }

    /// Resolve the sendable amount for an entire-balance transfer
    ///
    /// Gas estimation falls back to the configured default unit count and
    /// the fee read falls back to zero; the balance read itself must
    /// succeed. Fails with `InsufficientFunds` when nothing remains after
    /// the reserve, which aborts only the calling job.
    pub async fn resolve_send_all(
        &self,
        identity: Address,
        recipient: Address,
    ) -> DispatchResult<U256> {
        let balance = self.endpoint.native_balance(identity).await?;

        let estimated = match self
            .endpoint
            .estimate_gas(identity, recipient, U256::ZERO, &Bytes::new())
            .await
        {
            Ok(units) => self.config.apply_headroom(units),
            Err(e) => {
                debug!("gas estimation failed, using fallback limit: {}", e);
                self.config.fallback_gas_limit
            }
        };

        let fee_per_unit = match self.oracle.current_fees().await {
            Ok(quote) => quote.max_fee_per_unit(),
            Err(e) => {
                debug!("fee query failed, reserving nothing for fees: {}", e);
                0
            }
        };

        let reserved = U256::from(estimated).saturating_mul(U256::from(fee_per_unit));
        let sendable = balance.saturating_sub(reserved);

        if sendable.is_zero() {
            return Err(DispatchError::InsufficientFunds {
                required: reserved,
                available: balance,
            });
        }

        debug!(
            "entire-balance resolution for {}: balance {}, reserved {}, sendable {}",
            identity, balance, reserved, sendable
        );
        Ok(sendable)
    }
}

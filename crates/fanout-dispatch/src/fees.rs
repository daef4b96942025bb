use std::sync::Arc;

use alloy::primitives::Address;

use crate::endpoint::Endpoint;
use crate::error::DispatchResult;

/// Fee offer attached to a submission, in the shape the endpoint supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeQuote {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

impl FeeQuote {
    /// Multiply every fee field by `factor`, saturating at the type bound
    pub fn scaled(&self, factor: u128) -> FeeQuote {
        match *self {
            FeeQuote::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => FeeQuote::Eip1559 {
                max_fee_per_gas: max_fee_per_gas.saturating_mul(factor),
                max_priority_fee_per_gas: max_priority_fee_per_gas.saturating_mul(factor),
            },
            FeeQuote::Legacy { gas_price } => FeeQuote::Legacy {
                gas_price: gas_price.saturating_mul(factor),
            },
        }
    }

    /// The worst-case price per gas unit this quote commits to
    pub fn max_fee_per_unit(&self) -> u128 {
        match *self {
            FeeQuote::Eip1559 { max_fee_per_gas, .. } => max_fee_per_gas,
            FeeQuote::Legacy { gas_price } => gas_price,
        }
    }
}

/// Read-only fee and sequence queries against the remote endpoint
#[derive(Clone)]
pub struct FeeOracle {
    endpoint: Arc<dyn Endpoint>,
}

impl FeeOracle {
    pub fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self { endpoint }
    }

    /// Current fee suggestion from the endpoint
    pub async fn current_fees(&self) -> DispatchResult<FeeQuote> {
        Ok(self.endpoint.fee_quote().await?)
    }

    /// Latest confirmed transaction count for `identity`
    pub async fn next_sequence(&self, identity: Address) -> DispatchResult<u64> {
        Ok(self.endpoint.transaction_count(identity).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip1559_scaling() {
        let quote = FeeQuote::Eip1559 {
            max_fee_per_gas: 100,
            max_priority_fee_per_gas: 10,
        };
        assert_eq!(
            quote.scaled(3),
            FeeQuote::Eip1559 {
                max_fee_per_gas: 300,
                max_priority_fee_per_gas: 30,
            }
        );
    }

    #[test]
    fn test_legacy_scaling_saturates() {
        let quote = FeeQuote::Legacy {
            gas_price: u128::MAX / 2,
        };
        assert_eq!(
            quote.scaled(4),
            FeeQuote::Legacy {
                gas_price: u128::MAX
            }
        );
    }

    #[test]
    fn test_max_fee_per_unit() {
        let pair = FeeQuote::Eip1559 {
            max_fee_per_gas: 700,
            max_priority_fee_per_gas: 2,
        };
        assert_eq!(pair.max_fee_per_unit(), 700);

        let legacy = FeeQuote::Legacy { gas_price: 55 };
        assert_eq!(legacy.max_fee_per_unit(), 55);
    }
}

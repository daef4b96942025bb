use alloy::primitives::U256;
use thiserror::Error;

use crate::endpoint::EndpointError;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while dispatching a transfer batch
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("endpoint query failed: {0}")]
    QueryFailed(#[from] EndpointError),

    #[error("transfer failed after {attempts} attempts: {last_error}")]
    SendFailed { attempts: u32, last_error: String },

    #[error("insufficient funds: need {required} wei reserved, have {available}")]
    InsufficientFunds { required: U256, available: U256 },

    #[error("signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::fees::FeeQuote;

sol! {
    #[sol(rpc)]
    contract ERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// Errors surfaced by the remote ledger endpoint
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("contract call error: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("{0}")]
    Rejected(String),
}

pub type EndpointResult<T> = Result<T, EndpointError>;

/// Remote ledger surface the dispatch engine runs against
///
/// Queries may be shared read-only across jobs; submissions carry
/// pre-signed payloads, so the endpoint never sees key material.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Chain the endpoint serves; stamped into every intent
    fn chain_id(&self) -> u64;

    async fn native_balance(&self, address: Address) -> EndpointResult<U256>;

    /// Latest confirmed transaction count (the next usable sequence number)
    async fn transaction_count(&self, address: Address) -> EndpointResult<u64>;

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        input: &Bytes,
    ) -> EndpointResult<u64>;

    async fn fee_quote(&self) -> EndpointResult<FeeQuote>;

    /// Submit a signed transaction and return its hash
    async fn send_raw(&self, raw: Bytes) -> EndpointResult<B256>;
}

/// Decimals and display symbol read from a token contract
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub decimals: u8,
    pub symbol: String,
}

/// JSON-RPC implementation over an HTTP provider
pub struct HttpEndpoint {
    provider: DynProvider,
    chain_id: u64,
}

impl HttpEndpoint {
    pub fn new(provider: DynProvider, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }

    pub fn connect(url: Url, chain_id: u64) -> Self {
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Self::new(provider, chain_id)
    }

    /// Read a token's decimals and symbol, once, before any amounts are scaled
    pub async fn token_metadata(&self, contract: Address) -> EndpointResult<TokenMetadata> {
        let token = ERC20::new(contract, self.provider.clone());
        let decimals = token.decimals().call().await?;
        let symbol = token.symbol().call().await?;
        Ok(TokenMetadata { decimals, symbol })
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn native_balance(&self, address: Address) -> EndpointResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn transaction_count(&self, address: Address) -> EndpointResult<u64> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        input: &Bytes,
    ) -> EndpointResult<u64> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value)
            .with_input(input.clone());
        Ok(self.provider.estimate_gas(request).await?)
    }

    async fn fee_quote(&self) -> EndpointResult<FeeQuote> {
        match self.provider.estimate_eip1559_fees().await {
            Ok(estimate) => Ok(FeeQuote::Eip1559 {
                max_fee_per_gas: estimate.max_fee_per_gas,
                max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
            }),
            Err(e) => {
                debug!("eip-1559 estimate unavailable, falling back to gas price: {}", e);
                let gas_price = self.provider.get_gas_price().await?;
                Ok(FeeQuote::Legacy { gas_price })
            }
        }
    }

    async fn send_raw(&self, raw: Bytes) -> EndpointResult<B256> {
        let pending = self.provider.send_raw_transaction(raw.as_ref()).await?;
        Ok(*pending.tx_hash())
    }
}

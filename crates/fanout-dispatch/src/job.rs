use std::fmt;

use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;

/// Asset being transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The chain's base currency, moved through the transaction value field
    Native,
    /// An ERC-20 token, moved through a contract call
    Token(Address),
}

/// How much to transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSpec {
    /// Exact amount in smallest units
    Fixed(U256),
    /// Whatever the sender can afford after reserving the settlement cost;
    /// only valid for native transfers
    EntireBalance,
}

/// One unit of dispatch work: a signing identity, a destination, and an amount
pub struct TransferJob {
    pub signer: PrivateKeySigner,
    pub recipient: Address,
    pub asset: AssetKind,
    pub amount: AmountSpec,
}

impl TransferJob {
    pub fn new(
        signer: PrivateKeySigner,
        recipient: Address,
        asset: AssetKind,
        amount: AmountSpec,
    ) -> Self {
        Self {
            signer,
            recipient,
            asset,
            amount,
        }
    }

    /// Address the transfer is sent from
    pub fn sender(&self) -> Address {
        self.signer.address()
    }
}

// Key material must never leak through logs; show the derived address only.
impl fmt::Debug for TransferJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferJob")
            .field("from", &self.sender())
            .field("recipient", &self.recipient)
            .field("asset", &self.asset)
            .field("amount", &self.amount)
            .finish()
    }
}

/// Terminal outcome of one job; exactly one exists per dispatched job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub ok: bool,
    pub from: Address,
    pub to: Address,
    pub tx_hash: Option<B256>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(from: Address, to: Address, tx_hash: B256) -> Self {
        Self {
            ok: true,
            from,
            to,
            tx_hash: Some(tx_hash),
            error: None,
        }
    }

    pub fn failure(from: Address, to: Address, error: String) -> Self {
        Self {
            ok: false,
            from,
            to,
            tx_hash: None,
            error: Some(error),
        }
    }
}

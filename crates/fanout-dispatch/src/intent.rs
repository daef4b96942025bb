use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::AccessList;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;

use crate::endpoint::ERC20;
use crate::error::{DispatchError, DispatchResult};
use crate::fees::FeeQuote;
use crate::job::{AssetKind, TransferJob};

/// Mutable working state for one submission attempt sequence
///
/// Owned exclusively by one job's execution context. The retry loop fills
/// unset fields from endpoint defaults on the first attempt and mutates
/// fees and sequence in place on remediation rounds.
#[derive(Debug, Clone)]
pub struct TransactionIntent {
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
    pub chain_id: u64,
    pub gas_limit: Option<u64>,
    pub fees: Option<FeeQuote>,
    pub sequence: Option<u64>,
}

impl TransactionIntent {
    /// Build the intent for a resolved transfer amount
    ///
    /// Native transfers carry the amount in the value field; token transfers
    /// call the contract with `transfer(recipient, amount)` calldata.
    pub fn for_transfer(job: &TransferJob, amount: U256, chain_id: u64) -> Self {
        let (to, value, input) = match job.asset {
            AssetKind::Native => (job.recipient, amount, Bytes::new()),
            AssetKind::Token(contract) => (
                contract,
                U256::ZERO,
                ERC20::transferCall {
                    to: job.recipient,
                    amount,
                }
                .abi_encode()
                .into(),
            ),
        };

        Self {
            to,
            value,
            input,
            chain_id,
            gas_limit: None,
            fees: None,
            sequence: None,
        }
    }

    /// Sign the populated intent and return the raw encoded transaction
    pub fn sign(&self, signer: &PrivateKeySigner) -> DispatchResult<Bytes> {
        let (Some(gas_limit), Some(fees), Some(sequence)) =
            (self.gas_limit, self.fees, self.sequence)
        else {
            return Err(DispatchError::Config(
                "transaction intent is missing populated fields".to_string(),
            ));
        };

        let raw = match fees {
            FeeQuote::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let mut tx = TxEip1559 {
                    chain_id: self.chain_id,
                    nonce: sequence,
                    gas_limit,
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                    to: TxKind::Call(self.to),
                    value: self.value,
                    access_list: AccessList::default(),
                    input: self.input.clone(),
                };
                let signature = signer.sign_transaction_sync(&mut tx)?;
                let signed: TxEnvelope = tx.into_signed(signature).into();
                signed.encoded_2718()
            }
            FeeQuote::Legacy { gas_price } => {
                let mut tx = TxLegacy {
                    chain_id: Some(self.chain_id),
                    nonce: sequence,
                    gas_price,
                    gas_limit,
                    to: TxKind::Call(self.to),
                    value: self.value,
                    input: self.input.clone(),
                };
                let signature = signer.sign_transaction_sync(&mut tx)?;
                let signed: TxEnvelope = tx.into_signed(signature).into();
                signed.encoded_2718()
            }
        };

        Ok(raw.into())
    }
}

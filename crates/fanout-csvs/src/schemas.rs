/*!
# CSV Schema Definitions

This module defines the authoritative CSV schemas for a dispatch run.
These schemas serve as the contract between:
- Operator-prepared input files (`senders.csv`, `recipients.csv`)
- The `fanout send` command (consumer)
- The results log the command writes back out
*/

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::CsvError;

// ================================================================================================
// Senders CSV Schema
// ================================================================================================

/// Expected headers for senders.csv in exact order
pub const SENDERS_CSV_HEADERS: &[&str] = &["secret_key", "amount"];

/// Row structure for senders.csv
///
/// **File**: `senders.csv`
/// **Purpose**: Signing keys funding the transfers, one per row
/// **Producer**: the operator
/// **Consumer**: `fanout send`
///
/// The secret key is parsed straight into a signer and is never
/// re-serialized; there is deliberately no write support for this file.
#[derive(Clone, Deserialize)]
pub struct SenderRow {
    /// Hex-encoded 32-byte signing key, `0x` prefix optional
    #[serde(deserialize_with = "deserialize_secret_key")]
    pub secret_key: PrivateKeySigner,

    /// Amount cell: decimal human-unit amount, `all`, or empty
    pub amount: AmountCell,
}

impl fmt::Debug for SenderRow {
    // Key material must never leak through logs; show the derived address only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderRow")
            .field("address", &self.secret_key.address())
            .field("amount", &self.amount)
            .finish()
    }
}

// ================================================================================================
// Recipients CSV Schema
// ================================================================================================

/// Expected headers for recipients.csv in exact order
pub const RECIPIENTS_CSV_HEADERS: &[&str] = &["address", "amount"];

/// Row structure for recipients.csv
///
/// **File**: `recipients.csv`
/// **Purpose**: Transfer destinations, one per row
/// **Producer**: the operator
/// **Consumer**: `fanout send`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipientRow {
    /// Recipient address in hex (checksummed or plain)
    pub address: Address,

    /// Amount cell: decimal human-unit amount, `all`, or empty
    pub amount: AmountCell,
}

// ================================================================================================
// Amount Cells
// ================================================================================================

/// One amount cell from either input file
///
/// Cells stay in human units here; scaling to smallest units happens once,
/// after asset decimals are known, in the layer that builds jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountCell {
    /// Empty cell; the other file's row must carry the amount
    Unspecified,
    /// The literal `all`: send everything the account holds
    All,
    /// Decimal human-unit amount
    Value(Decimal),
}

impl AmountCell {
    pub fn is_specified(&self) -> bool {
        !matches!(self, AmountCell::Unspecified)
    }
}

impl FromStr for AmountCell {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(AmountCell::Unspecified);
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(AmountCell::All);
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|e| CsvError::InvalidAmount(format!("'{}': {}", trimmed, e)))?;
        if value.is_sign_negative() {
            return Err(CsvError::InvalidAmount(format!(
                "'{}': negative amounts are not allowed",
                trimmed
            )));
        }
        Ok(AmountCell::Value(value))
    }
}

impl fmt::Display for AmountCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountCell::Unspecified => Ok(()),
            AmountCell::All => write!(f, "all"),
            AmountCell::Value(value) => write!(f, "{}", value),
        }
    }
}

impl<'de> Deserialize<'de> for AmountCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AmountCell::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ================================================================================================
// Paired Transfers
// ================================================================================================

/// One validated sender/recipient/amount triple produced by pairing the
/// two input files (see `pair_transfers`)
#[derive(Clone)]
pub struct PairedTransfer {
    pub secret_key: PrivateKeySigner,
    pub recipient: Address,
    pub amount: AmountCell,
}

impl fmt::Debug for PairedTransfer {
    // Key material must never leak through logs; show the derived address only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairedTransfer")
            .field("from", &self.secret_key.address())
            .field("recipient", &self.recipient)
            .field("amount", &self.amount)
            .finish()
    }
}

// ================================================================================================
// Results File Schema
// ================================================================================================

/// Status marker opening each results line
pub const RESULT_OK_MARKER: &str = "OK";
pub const RESULT_FAIL_MARKER: &str = "FAIL";

/// One line of the results file
///
/// **Layout**: `OK|FAIL,<from>,<to>,<hash or empty>,"<error or empty>"`,
/// one line per job, no header row. The error field is always quoted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub ok: bool,
    pub from: Address,
    pub to: Address,
    pub tx_hash: Option<B256>,
    pub error: String,
}

// ================================================================================================
// Custom Serde Functions
// ================================================================================================

/// Deserialize a hex secret key cell into a signer
fn deserialize_secret_key<'de, D>(deserializer: D) -> Result<PrivateKeySigner, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    // Never echo the offending cell; it is key material.
    PrivateKeySigner::from_str(s.trim())
        .map_err(|e| serde::de::Error::custom(format!("invalid secret key: {}", e)))
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_sender_row_deserialization() {
        let csv_data = format!("secret_key,amount\n0x{},1.5\n{},all\n", TEST_KEY, TEST_KEY);
        let mut rdr = csv::Reader::from_reader(csv_data.as_bytes());
        let rows: Vec<SenderRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        let expected = PrivateKeySigner::from_str(TEST_KEY).unwrap().address();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].secret_key.address(), expected);
        assert_eq!(rows[0].amount, AmountCell::Value(Decimal::from_str("1.5").unwrap()));
        assert_eq!(rows[1].secret_key.address(), expected);
        assert_eq!(rows[1].amount, AmountCell::All);
    }

    #[test]
    fn test_sender_row_rejects_bad_key() {
        let csv_data = "secret_key,amount\nnot-a-key,1\n";
        let mut rdr = csv::Reader::from_reader(csv_data.as_bytes());
        let result: Result<Vec<SenderRow>, _> = rdr.deserialize().collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_sender_row_debug_redacts_key() {
        let row = SenderRow {
            secret_key: PrivateKeySigner::from_str(TEST_KEY).unwrap(),
            amount: AmountCell::All,
        };

        let debug = format!("{:?}", row);
        assert!(!debug.contains(TEST_KEY));
        assert!(debug.contains(&row.secret_key.address().to_string()));
    }

    #[test]
    fn test_recipient_row_deserialization() {
        let csv_data =
            "address,amount\n0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045,2\n0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045,\n";
        let mut rdr = csv::Reader::from_reader(csv_data.as_bytes());
        let rows: Vec<RecipientRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, AmountCell::Value(Decimal::from(2)));
        assert_eq!(rows[1].amount, AmountCell::Unspecified);
    }

    #[test]
    fn test_amount_cell_grammar() {
        assert_eq!(AmountCell::from_str("").unwrap(), AmountCell::Unspecified);
        assert_eq!(AmountCell::from_str("  ").unwrap(), AmountCell::Unspecified);
        assert_eq!(AmountCell::from_str("all").unwrap(), AmountCell::All);
        assert_eq!(AmountCell::from_str("ALL").unwrap(), AmountCell::All);
        assert_eq!(
            AmountCell::from_str("1.25").unwrap(),
            AmountCell::Value(Decimal::from_str("1.25").unwrap())
        );

        assert!(AmountCell::from_str("-3").is_err());
        assert!(AmountCell::from_str("garbage").is_err());
    }

    #[test]
    fn test_amount_cell_display() {
        assert_eq!(AmountCell::Unspecified.to_string(), "");
        assert_eq!(AmountCell::All.to_string(), "all");
        assert_eq!(
            AmountCell::Value(Decimal::from_str("0.5").unwrap()).to_string(),
            "0.5"
        );
    }
}

/*!
# CSV Validation & I/O

This module reads and validates the operator-prepared input files, pairs
them into per-job transfer triples, and writes the results log in its
exact contractual layout.
*/

use crate::{
    errors::{CsvError, CsvResult},
    schemas::{
        AmountCell, PairedTransfer, RecipientRow, ResultRow, SenderRow, RECIPIENTS_CSV_HEADERS,
        RESULT_FAIL_MARKER, RESULT_OK_MARKER, SENDERS_CSV_HEADERS,
    },
};
use alloy::primitives::{Address, B256};
use csv::{Reader, ReaderBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// ================================================================================================
// CSV Reading with Validation
// ================================================================================================

/// Read and validate a senders CSV file
pub fn read_senders_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<SenderRow>> {
    let file = File::open(path)?;
    let mut rdr = Reader::from_reader(file);

    // Validate headers
    let headers = rdr.headers()?;
    validate_headers(headers.iter(), SENDERS_CSV_HEADERS, "senders.csv")?;

    // Read and deserialize rows
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: SenderRow = result?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CsvError::SchemaValidation(
            "Senders CSV file is empty".to_string(),
        ));
    }

    Ok(rows)
}

/// Read and validate a recipients CSV file
pub fn read_recipients_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<RecipientRow>> {
    let file = File::open(path)?;
    let mut rdr = Reader::from_reader(file);

    // Validate headers
    let headers = rdr.headers()?;
    validate_headers(headers.iter(), RECIPIENTS_CSV_HEADERS, "recipients.csv")?;

    // Read and deserialize rows
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RecipientRow = result?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(CsvError::SchemaValidation(
            "Recipients CSV file is empty".to_string(),
        ));
    }

    Ok(rows)
}

// ================================================================================================
// Cross-CSV Pairing
// ================================================================================================

/// Pair the two input files into per-job transfer triples
///
/// Ensures:
/// - At most one of the two files lists multiple rows (one sender fanning
///   out to many recipients, or many senders funding one recipient)
/// - Every pairing carries an amount: the varying side's cell wins, the
///   fixed side's cell is the fallback
pub fn pair_transfers(
    senders: &[SenderRow],
    recipients: &[RecipientRow],
) -> CsvResult<Vec<PairedTransfer>> {
    if senders.is_empty() || recipients.is_empty() {
        return Err(CsvError::SchemaValidation(
            "Sender and recipient lists must not be empty".to_string(),
        ));
    }
    if senders.len() > 1 && recipients.len() > 1 {
        return Err(CsvError::DataInconsistency(format!(
            "{} senders and {} recipients: only one file may list multiple rows",
            senders.len(),
            recipients.len()
        )));
    }

    let mut pairs = Vec::new();
    if senders.len() == 1 {
        let sender = &senders[0];
        for (i, recipient) in recipients.iter().enumerate() {
            let amount = resolve_amount(&recipient.amount, &sender.amount).ok_or_else(|| {
                CsvError::DataInconsistency(format!(
                    "recipients.csv row {}: no amount given in either file",
                    i + 1
                ))
            })?;
            pairs.push(PairedTransfer {
                secret_key: sender.secret_key.clone(),
                recipient: recipient.address,
                amount,
            });
        }
    } else {
        let recipient = &recipients[0];
        for (i, sender) in senders.iter().enumerate() {
            let amount = resolve_amount(&sender.amount, &recipient.amount).ok_or_else(|| {
                CsvError::DataInconsistency(format!(
                    "senders.csv row {}: no amount given in either file",
                    i + 1
                ))
            })?;
            pairs.push(PairedTransfer {
                secret_key: sender.secret_key.clone(),
                recipient: recipient.address,
                amount,
            });
        }
    }

    Ok(pairs)
}

fn resolve_amount(own: &AmountCell, fallback: &AmountCell) -> Option<AmountCell> {
    match own {
        AmountCell::Unspecified => fallback.is_specified().then(|| *fallback),
        specified => Some(*specified),
    }
}

// ================================================================================================
// Results File I/O
// ================================================================================================

/// Write the results log in its exact layout
///
/// One line per job, no header row; the error field is always quoted,
/// with internal quotes doubled.
pub fn write_results_csv<P: AsRef<Path>>(path: P, rows: &[ResultRow]) -> CsvResult<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    for row in rows {
        let marker = if row.ok { RESULT_OK_MARKER } else { RESULT_FAIL_MARKER };
        let hash = row.tx_hash.map(|h| h.to_string()).unwrap_or_default();
        let error = row.error.replace('"', "\"\"");
        writeln!(out, "{},{},{},{},\"{}\"", marker, row.from, row.to, hash, error)?;
    }

    out.flush()?;
    Ok(())
}

/// Read a results log written by `write_results_csv`
pub fn read_results_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<ResultRow>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new().has_headers(false).from_reader(file);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.len() != 5 {
            return Err(CsvError::InvalidFormat(format!(
                "results row {}: expected 5 fields, found {}",
                rows.len() + 1,
                record.len()
            )));
        }

        let ok = match &record[0] {
            m if m == RESULT_OK_MARKER => true,
            m if m == RESULT_FAIL_MARKER => false,
            other => {
                return Err(CsvError::InvalidFormat(format!(
                    "unknown result marker '{}'",
                    other
                )))
            }
        };
        let from = parse_address(&record[1])?;
        let to = parse_address(&record[2])?;
        let tx_hash = if record[3].is_empty() {
            None
        } else {
            Some(record[3].parse::<B256>().map_err(|e| {
                CsvError::InvalidFormat(format!("transaction hash '{}': {}", &record[3], e))
            })?)
        };

        rows.push(ResultRow {
            ok,
            from,
            to,
            tx_hash,
            error: record[4].to_string(),
        });
    }

    Ok(rows)
}

fn parse_address(s: &str) -> CsvResult<Address> {
    s.parse::<Address>()
        .map_err(|e| CsvError::InvalidAddress(format!("'{}': {}", s, e)))
}

// ================================================================================================
// Header Validation
// ================================================================================================

fn validate_headers<'a, I>(actual: I, expected: &[&str], file_type: &str) -> CsvResult<()>
where
    I: Iterator<Item = &'a str>,
{
    let actual_headers: Vec<&str> = actual.collect();

    if actual_headers.len() != expected.len() {
        return Err(CsvError::SchemaValidation(format!(
            "{}: expected {} headers, found {}",
            file_type,
            expected.len(),
            actual_headers.len()
        )));
    }

    for (i, (actual, expected)) in actual_headers.iter().zip(expected.iter()).enumerate() {
        if actual != expected {
            return Err(CsvError::SchemaValidation(format!(
                "{}: header {} should be '{}', found '{}'",
                file_type,
                i + 1,
                expected,
                actual
            )));
        }
    }

    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================

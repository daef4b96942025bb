/*!
# Fanout CSV Schema Definitions

This crate provides the **authoritative CSV schemas** used by the fanout CLI.

## Purpose

This crate serves as the **single source of truth** for the file contracts
around a dispatch run:

- **`senders.csv`** (operator-prepared) → signing keys funding the transfers
- **`recipients.csv`** (operator-prepared) → transfer destinations
- **Results log** (written by `fanout send`) → one outcome line per job

## Schema Files

### Senders CSV (`senders.csv`)
Contains signing keys with columns:
- `secret_key`: hex-encoded 32-byte signing key (`0x` prefix optional)
- `amount`: decimal human-unit amount, the literal `all`, or empty

Secret keys are parsed straight into signers and never re-serialized;
this crate deliberately has no write support for senders.csv.

### Recipients CSV (`recipients.csv`)
Contains transfer destinations with columns:
- `address`: recipient address in hex (checksummed or plain)
- `amount`: same grammar as the senders amount cell

Exactly one of the two input files may list multiple rows. When pairing,
the varying side's amount cell wins and the fixed side's cell is the
fallback.

### Results file
One line per job, no header row:

```text
OK|FAIL,<from>,<to>,<hash or empty>,"<error or empty>"
```

## Usage

```rust
use fanout_csvs::{pair_transfers, read_recipients_csv, read_senders_csv, CsvResult};

fn example() -> CsvResult<()> {
    // Read and validate the operator-prepared files
    let senders = read_senders_csv("senders.csv")?;
    let recipients = read_recipients_csv("recipients.csv")?;

    // Pair them into per-job transfer triples
    let transfers = pair_transfers(&senders, &recipients)?;
    let _ = transfers;

    Ok(())
}
```
*/

pub mod errors;
pub mod schemas;
pub mod validation;

// Re-export main types for convenience
pub use errors::{CsvError, CsvResult};
pub use schemas::{
    AmountCell, PairedTransfer, RecipientRow, ResultRow, SenderRow, RECIPIENTS_CSV_HEADERS,
    RESULT_FAIL_MARKER, RESULT_OK_MARKER, SENDERS_CSV_HEADERS,
};
pub use validation::{
    pair_transfers, read_recipients_csv, read_results_csv, read_senders_csv, write_results_csv,
};

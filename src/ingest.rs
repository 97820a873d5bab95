//! Batch ingestion adapters.
//!
//! The engine consumes a [`TransactionBatch`]; this module coerces the
//! two feed formats into one — the CSV layout the upstream exporters
//! produce (plain values, never quoted) and an equivalent JSON shape.
//! Schema and value errors are fatal for the whole batch and surfaced
//! verbatim; an empty feed is a valid zero-transaction batch.

use crate::core::account::AccountId;
use crate::core::transaction::{Transaction, TransactionBatch};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// The five columns every record must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Batch-fatal ingestion failures.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("row {row}: missing field '{field}'")]
    MissingField { row: usize, field: String },
    #[error("row {row}: invalid amount '{value}'")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: invalid timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("invalid JSON batch: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a CSV feed.
///
/// The header may order columns freely and carry extras; all five
/// [`REQUIRED_COLUMNS`] must be present. Timestamps accept
/// `YYYY-MM-DD HH:MM:SS` (the exporter format) or RFC 3339.
pub fn from_csv_str(content: &str) -> Result<TransactionBatch, IngestError> {
    let mut lines = content.lines();
    let Some(header) = lines.next() else {
        return Ok(TransactionBatch::new());
    };

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let mut positions = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, required) in REQUIRED_COLUMNS.iter().enumerate() {
        match columns.iter().position(|c| c == required) {
            Some(p) => positions[slot] = p,
            None => return Err(IngestError::MissingColumn(required.to_string())),
        }
    }

    let mut batch = TransactionBatch::new();
    for (line_idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        // 1-based, counting the header
        let row = line_idx + 2;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        let field = |slot: usize| -> Result<&str, IngestError> {
            fields
                .get(positions[slot])
                .copied()
                .ok_or_else(|| IngestError::MissingField {
                    row,
                    field: REQUIRED_COLUMNS[slot].to_string(),
                })
        };

        let transaction_id = field(0)?;
        let sender_id = field(1)?;
        let receiver_id = field(2)?;
        let raw_amount = field(3)?;
        let raw_timestamp = field(4)?;

        let amount: f64 = raw_amount
            .parse()
            .map_err(|_| IngestError::InvalidAmount {
                row,
                value: raw_amount.to_string(),
            })?;
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| IngestError::InvalidTimestamp {
                row,
                value: raw_timestamp.to_string(),
            })?;

        batch.add(Transaction::new(
            transaction_id,
            AccountId::new(sender_id),
            AccountId::new(receiver_id),
            amount,
            timestamp,
        ));
    }

    Ok(batch)
}

#[derive(Deserialize)]
struct RecordInput {
    transaction_id: String,
    sender_id: String,
    receiver_id: String,
    amount: f64,
    timestamp: String,
}

#[derive(Deserialize)]
struct BatchFile {
    transactions: Vec<RecordInput>,
}

/// Parse a JSON feed of the form
/// `{"transactions": [{transaction_id, sender_id, receiver_id, amount, timestamp}]}`.
///
/// A record missing any field is rejected by deserialization, which
/// makes the schema check come for free.
pub fn from_json_str(content: &str) -> Result<TransactionBatch, IngestError> {
    let file: BatchFile = serde_json::from_str(content)?;

    let mut batch = TransactionBatch::new();
    for (i, record) in file.transactions.into_iter().enumerate() {
        let timestamp =
            parse_timestamp(&record.timestamp).ok_or_else(|| IngestError::InvalidTimestamp {
                row: i + 1,
                value: record.timestamp.clone(),
            })?;
        batch.add(Transaction::new(
            record.transaction_id,
            AccountId::new(record.sender_id),
            AccountId::new(record.receiver_id),
            record.amount,
            timestamp,
        ));
    }
    Ok(batch)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

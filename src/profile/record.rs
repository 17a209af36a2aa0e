//! Transaction record normalization
//!
//! Converts raw ledger payloads (as returned by the fullnode REST API) into
//! the canonical [`TransactionRecord`] shape. The raw payload is handled as
//! loose JSON: every field except the timestamp falls back to an empty
//! default when it is missing or has an unexpected type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::profile::sanitize::sanitize_arguments;

/// Transaction type carrying user payload semantics
pub const USER_TRANSACTION: &str = "user_transaction";

/// Payload type tag for entry-function calls
pub const ENTRY_FUNCTION_PAYLOAD: &str = "entry_function_payload";

/// Canonical shape of one ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger sequence number
    pub version: u64,

    /// Transaction kind ("user_transaction", "block_metadata_transaction", ...)
    #[serde(rename = "type")]
    pub tx_type: String,

    pub timestamp: DateTime<Utc>,

    pub sender: String,

    /// Best-effort recipient, empty when not derivable
    pub recipient: String,

    /// `Module::function` with the module address stripped
    pub function: String,

    /// Best-effort amount, empty when not derivable
    pub amount: String,

    /// Sanitized entry-function arguments
    pub arguments: Vec<Value>,
}

impl TransactionRecord {
    /// Check if this record is an entry-function call
    pub fn has_function(&self) -> bool {
        !self.function.is_empty()
    }
}

/// Normalize a single raw transaction payload.
///
/// Fails only when the timestamp is missing or unparseable; the wallet age
/// computation cannot tolerate a silently invented reference point.
pub fn normalize(raw: &Value) -> Result<TransactionRecord> {
    let timestamp = parse_timestamp(raw.get("timestamp"))?;
    let tx_type = str_field(raw, "type");

    let mut record = TransactionRecord {
        version: parse_u64(raw.get("version")).unwrap_or(0),
        tx_type,
        timestamp,
        sender: str_field(raw, "sender"),
        recipient: String::new(),
        function: String::new(),
        amount: String::new(),
        arguments: Vec::new(),
    };

    if record.tx_type != USER_TRANSACTION {
        return Ok(record);
    }

    let payload = match raw.get("payload") {
        Some(p) if p.get("type").and_then(Value::as_str) == Some(ENTRY_FUNCTION_PAYLOAD) => p,
        _ => return Ok(record),
    };

    record.function = strip_module_address(payload.get("function").and_then(Value::as_str).unwrap_or(""));
    record.arguments = payload
        .get("arguments")
        .and_then(Value::as_array)
        .map(|args| sanitize_arguments(args))
        .unwrap_or_default();

    // Positional guess: transfer-like calls usually take (recipient, amount).
    // Not an ABI decode; functions with other argument orders get wrong values.
    if record.function.contains("transfer") {
        if let Some(first) = record.arguments.first() {
            record.recipient = scalar_text(first);
        }
        if let Some(second) = record.arguments.get(1) {
            record.amount = scalar_text(second);
        }
    }

    Ok(record)
}

/// Normalize a batch of raw payloads, keeping input order.
///
/// Records whose timestamp cannot be parsed are dropped with a warning so a
/// single bad payload never aborts the rest of the batch.
pub fn normalize_batch(raws: &[Value]) -> Vec<TransactionRecord> {
    raws.iter()
        .enumerate()
        .filter_map(|(position, raw)| match normalize(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(position, error = %e, "Dropping transaction with unusable timestamp");
                None
            }
        })
        .collect()
}

/// Drop the leading module-address segment: `0x1::coin::transfer` -> `coin::transfer`
fn strip_module_address(path: &str) -> String {
    match path.split_once("::") {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    }
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The REST API encodes u64 values as strings; accept both forms
fn parse_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_timestamp(value: Option<&Value>) -> Result<DateTime<Utc>> {
    let value = value.ok_or_else(|| Error::InvalidTimestamp("missing".to_string()))?;

    let micros = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::InvalidTimestamp(value.to_string()))?;

    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::InvalidTimestamp(format!("{} out of range", micros)))
}

/// Whole-number floats (`1.7e15`) are accepted as integers
fn integral_f64(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Render an argument as text for the recipient/amount fields
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

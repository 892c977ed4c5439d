//! Parsing of `getAccountInfo` style result envelopes.

use crate::AccountError;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::warn;
use serde_json::Value;
use solana_sdk::{bs58, pubkey::Pubkey};

/// Account state extracted from one successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub slot: u64,
    pub lamports: u64,
    pub data: Option<Vec<u8>>,
}

/// Parse a full `{"context": {"slot": N}, "value": {...}}` envelope.
///
/// A `null` value means the account does not exist; a missing value or
/// missing `context.slot` means the response is malformed.
pub fn parse_account_info(key: &Pubkey, response: &Value) -> Result<AccountInfo, AccountError> {
    let value = match response.get("value") {
        None => {
            return Err(AccountError::MissingValue { key: *key, response: response.clone() })
        }
        Some(Value::Null) => {
            return Err(AccountError::NullValue { key: *key, response: response.clone() })
        }
        Some(value) => value,
    };

    let slot = response
        .get("context")
        .and_then(|context| context.get("slot"))
        .and_then(Value::as_u64)
        .ok_or_else(|| AccountError::MissingSlot { key: *key, response: response.clone() })?;

    parse_account_value(key, slot, value)
}

/// Parse the `value` object of a response whose slot is already known.
///
/// Data in an encoding we cannot decode is dropped; slot and lamports still apply.
pub fn parse_account_value(
    key: &Pubkey,
    slot: u64,
    value: &Value,
) -> Result<AccountInfo, AccountError> {
    if value.is_null() {
        return Err(AccountError::NullValue { key: *key, response: value.clone() });
    }

    let lamports = value
        .get("lamports")
        .and_then(Value::as_u64)
        .ok_or_else(|| AccountError::MissingLamports { key: *key, value: value.clone() })?;

    let data = match value.get("data") {
        None | Some(Value::Null) => None,
        Some(data) => match decode_data(data) {
            Ok(bytes) => Some(bytes),
            Err(reason) => {
                warn!("dropping data of account {} at slot {}: {}", key, slot, reason);
                None
            }
        },
    };

    Ok(AccountInfo { slot, lamports, data })
}

/// Decode the `data` field of an account value.
///
/// Accepts `["<payload>", "base64" | "base58"]` and the legacy bare base58 string.
pub fn decode_data(data: &Value) -> Result<Vec<u8>, String> {
    match data {
        Value::String(payload) => decode_base58(payload),
        Value::Array(parts) => {
            let payload = parts.first().and_then(Value::as_str).ok_or("missing data payload")?;
            match parts.get(1).and_then(Value::as_str) {
                Some("base64") => STANDARD.decode(payload).map_err(|e| e.to_string()),
                Some("base58") => decode_base58(payload),
                Some(other) => Err(format!("unsupported data encoding {}", other)),
                None => Err("missing data encoding".to_string()),
            }
        }
        other => Err(format!("unsupported data format {}", other)),
    }
}

fn decode_base58(payload: &str) -> Result<Vec<u8>, String> {
    bs58::decode(payload).into_vec().map_err(|e| e.to_string())
}

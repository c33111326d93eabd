use crate::error::{OctoheatError, Result};
use serde_json::Value;

/// Fail with `InvalidResponse` unless `data` is an object containing `key`.
///
/// The error carries the whole serialized `data` for diagnosis.
pub fn require_key(data: &Value, key: &str) -> Result<()> {
    match data.as_object() {
        Some(map) if map.contains_key(key) => Ok(()),
        _ => Err(OctoheatError::invalid_response(data)),
    }
}

/// Read a required numeric field, failing like [`require_key`] when absent
/// or not a number.
pub fn require_f64(data: &Value, key: &str) -> Result<f64> {
    require_key(data, key)?;
    data[key]
        .as_f64()
        .ok_or_else(|| OctoheatError::invalid_response(data))
}

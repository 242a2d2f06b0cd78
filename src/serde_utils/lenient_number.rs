//! Lenient numeric deserialization
//!
//! Price fields arrive from the backend as numbers, numeric strings, or on
//! bad days something else entirely. Display must degrade rather than fail,
//! so malformed values become 0 instead of a deserialization error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Deserialize a price that could be a string or a number into an `f64`,
/// treating anything malformed as 0.
pub fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(0.0))
}

/// Deserialize an optional price. Absent and `null` stay `None`; a present
/// but malformed value degrades to 0 rather than erroring.
pub fn lenient_price_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(number_from_value(&value).unwrap_or(0.0)))
}

//! Forgiving field decoders for upstream listing JSON.
//!
//! The listing provider is a scraper front-end: numeric fields arrive as
//! numbers, formatted strings (`"$1,250,000"`), `null`, or not at all, and
//! nested objects are occasionally replaced by strings. These helpers turn
//! every unusable value into `None` instead of failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::listing::ListingId;

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' ' | '_'))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub(crate) fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

pub(crate) fn u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value_to_f64(&value)
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64);
    Ok(count)
}

pub(crate) fn i32_opt<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)]
    let year = value_to_f64(&value)
        .filter(|v| *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v as i32);
    Ok(year)
}

pub(crate) fn id_opt<'de, D>(deserializer: D) -> Result<Option<ListingId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = match value {
        Value::String(s) if !s.trim().is_empty() => Some(ListingId(s.trim().to_owned())),
        Value::Number(n) => Some(ListingId(n.to_string())),
        _ => None,
    };
    Ok(id)
}

/// Decodes any nested object, yielding `None` when the value is `null` or
/// does not match the target shape.
pub(crate) fn object_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

pub(crate) fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    Ok(text)
}

/// Decodes a list of records, dropping entries that are not objects.
pub(crate) fn vec_of<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value::<T>(item)
                .map_err(|e| {
                    tracing::warn!(error = %e, "skipping malformed upstream record");
                })
                .ok()
        })
        .collect();
    if decoded.len() < total {
        tracing::debug!(total, kept = decoded.len(), "dropped malformed records");
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_to_f64_accepts_numbers_and_formatted_strings() {
        assert_eq!(value_to_f64(&json!(425_000)), Some(425_000.0));
        assert_eq!(value_to_f64(&json!("$1,250,000")), Some(1_250_000.0));
        assert_eq!(value_to_f64(&json!("2,850")), Some(2_850.0));
    }

    #[test]
    fn value_to_f64_rejects_non_numeric_values() {
        assert_eq!(value_to_f64(&json!(null)), None);
        assert_eq!(value_to_f64(&json!("call for price")), None);
        assert_eq!(value_to_f64(&json!(true)), None);
        assert_eq!(value_to_f64(&json!({"value": 3})), None);
    }
}

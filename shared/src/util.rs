//! Lenient scalar decoding for vendor payloads
//!
//! The integration backend is loose about scalar types: codes arrive as
//! numbers or strings, prices as numbers, comma-decimal strings or `null`,
//! flags as booleans, `"S"`/`"N"` or `0`/`1`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Scalar JSON value as a trimmed string. Objects, arrays and null give `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a decimal from a JSON number or a (possibly comma-decimal) string
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            // serde_json prints the shortest representation, so 3.335 stays 3.335
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // the later of ',' and '.' is the decimal mark: "1.234,56" and
    // "1,234.56" are both 1234.56
    let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), dot) if dot.is_none_or(|dot| comma > dot) => {
            trimmed.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => trimmed.replace(',', ""),
        _ => trimmed.to_string(),
    };
    Decimal::from_str(&normalized).ok()
}

/// Non-negative integer from a number, numeric string or integral float
pub fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean from `true`/`false`, `1`/`0`, `"S"`/`"N"`, `"true"`/`"false"`
pub fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "S" | "SIM" | "Y" | "TRUE" | "1" => Some(true),
            "N" | "NAO" | "NÃO" | "FALSE" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ========== serde adapters ==========

pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_to_string).unwrap_or_default())
}

pub fn lenient_string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(value_to_string)
        .filter(|s| !s.is_empty()))
}

pub fn lenient_decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_to_decimal))
}

pub fn lenient_bool_default_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_to_bool).unwrap_or(true))
}

//! Vendor response envelope
//!
//! Most integration actions answer with:
//! ```json
//! { "sucesso": <any | null>, "erro": <string | null> }
//! ```
//! A populated `erro` is a business rejection even when the HTTP status is 200.
//! Some actions answer with a bare value instead; those are wrapped as success.

use crate::util::value_to_string;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// UTF-8 byte-order mark some deployments prepend to response bodies
pub const BOM: char = '\u{feff}';

/// Success/error envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Success payload
    #[serde(rename = "sucesso", default)]
    pub success: Option<Value>,
    /// Business error text
    #[serde(rename = "erro", default, deserialize_with = "deserialize_error")]
    pub error: Option<String>,
}

impl Envelope {
    /// Successful envelope
    pub fn ok(payload: Value) -> Self {
        Self {
            success: Some(payload),
            error: None,
        }
    }

    /// Rejected envelope
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }

    /// `true` when `erro` is absent
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Success payload (null when absent) or the business error text
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.success.unwrap_or(Value::Null)),
        }
    }

    /// Classify an already-decoded JSON body.
    ///
    /// Objects carrying `sucesso` or `erro` are envelopes; anything else is a
    /// bare payload and counts as success.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let is_envelope = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("sucesso") || obj.contains_key("erro"));
        if is_envelope {
            serde_json::from_value(value)
        } else {
            Ok(Self::ok(value))
        }
    }

    /// Decode a raw response body, stripping a leading BOM first.
    /// An empty body is an empty success.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let body = strip_bom(body).trim();
        if body.is_empty() {
            return Ok(Self::ok(Value::Null));
        }
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }
}

/// Remove a single leading byte-order mark
pub fn strip_bom(body: &str) -> &str {
    body.strip_prefix(BOM).unwrap_or(body)
}

/// `erro` may be a string, a number or an object; blank strings count as absent.
fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Bool(false)) => None,
        Some(v @ (Value::Object(_) | Value::Array(_))) => Some(v.to_string()),
        Some(v) => value_to_string(&v).filter(|s| !s.is_empty()),
    })
}

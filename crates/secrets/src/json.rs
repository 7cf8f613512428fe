//! JSON post-processing of decoded secrets

use crate::DecodedSecret;
use serde_json::Value;

/// Outcome of attempting to read a secret as JSON
#[derive(Debug, Clone, PartialEq)]
pub enum JsonParse {
    /// The text was a JSON document
    Parsed(Value),
    /// The text is not JSON; use it as-is
    NotJson,
}

/// Try to parse `text` as a JSON document.
#[must_use]
pub fn parse_json(text: &str) -> JsonParse {
    serde_json::from_str::<Value>(text).map_or(JsonParse::NotJson, JsonParse::Parsed)
}

/// Value handed back to callers of [`get_secret`](crate::get_secret)
#[derive(Clone, PartialEq)]
pub enum SecretValue {
    /// Plain text secret
    Text(String),
    /// Undecoded binary secret
    Bytes(Vec<u8>),
    /// Secret parsed as JSON (object, array or scalar)
    Json(Value),
}

impl SecretValue {
    /// Text value, if this is plain text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Raw bytes, if this is a binary value
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Parsed JSON, if the secret was JSON
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<DecodedSecret> for SecretValue {
    fn from(decoded: DecodedSecret) -> Self {
        match decoded {
            DecodedSecret::Text(text) => Self::Text(text),
            DecodedSecret::Bytes(bytes) => Self::Bytes(bytes),
        }
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text([REDACTED])"),
            Self::Bytes(bytes) => write!(f, "Bytes([REDACTED; {} bytes])", bytes.len()),
            Self::Json(_) => f.write_str("Json([REDACTED])"),
        }
    }
}

/// Apply JSON post-processing to a decoded secret.
///
/// With `load_json` set, text that parses as JSON becomes
/// [`SecretValue::Json`]; anything else (including bytes) is returned
/// unchanged. Parse failures are never reported.
///
/// Parsing is strict JSON: `NaN`, `Infinity` and numbers outside the `f64`
/// range (`1e400`) are not accepted, so such secrets come back as text.
#[must_use]
pub fn return_secret(decoded: DecodedSecret, load_json: bool) -> SecretValue {
    if !load_json {
        return decoded.into();
    }

    match decoded {
        DecodedSecret::Text(text) => match parse_json(&text) {
            JsonParse::Parsed(value) => SecretValue::Json(value),
            JsonParse::NotJson => SecretValue::Text(text),
        },
        DecodedSecret::Bytes(bytes) => SecretValue::Bytes(bytes),
    }
}

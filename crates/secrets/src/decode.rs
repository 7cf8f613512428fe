//! Envelope decoding: base64, then bytes to text

use crate::{Result, SecretEnvelope, SecretError};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Character encodings accepted for binary secrets.
///
/// Names follow the usual codec spellings (`utf-8`, `latin-1`, ...), matched
/// case-insensitively with `_` and `-` treated alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// 7-bit ASCII
    Ascii,
    /// ISO-8859-1
    Latin1,
    /// UTF-16, little endian
    Utf16Le,
    /// UTF-16, big endian
    Utf16Be,
}

impl TextEncoding {
    /// Canonical codec name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
            Self::Utf16Le => "utf-16-le",
            Self::Utf16Be => "utf-16-be",
        }
    }

    /// Decode `bytes` into a string.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Encoding`] on byte sequences that are invalid
    /// for this encoding.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes).map_err(|e| self.error(e.to_string())),
            Self::Ascii => {
                if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(self.error(format!(
                        "byte 0x{:02x} at position {position} is out of range",
                        bytes[position]
                    )));
                }
                String::from_utf8(bytes).map_err(|e| self.error(e.to_string()))
            }
            Self::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(self.error(format!("odd byte length {}", bytes.len())));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| {
                        let pair = [pair[0], pair[1]];
                        if self == Self::Utf16Le {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| self.error(e.to_string()))
            }
        }
    }

    fn error(self, message: String) -> SecretError {
        SecretError::Encoding {
            encoding: self.name(),
            message,
        }
    }
}

impl FromStr for TextEncoding {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "u8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Self::Latin1),
            "utf-16-le" | "utf-16le" | "utf16le" => Ok(Self::Utf16Le),
            "utf-16-be" | "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            _ => Err(SecretError::UnknownEncoding {
                encoding: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = SecretError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(encoding: TextEncoding) -> Self {
        encoding.name().to_string()
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Controls for decoding a binary payload. Ignored for text payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Base64-decode the binary payload first
    pub base64_decode: bool,
    /// Decode the bytes into a string with `encoding`
    pub bytes_decode: bool,
    /// Encoding used when `bytes_decode` is set
    pub encoding: TextEncoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            base64_decode: true,
            bytes_decode: true,
            encoding: TextEncoding::Utf8,
        }
    }
}

/// A secret after envelope decoding.
///
/// Binary secrets decoded with `bytes_decode = false` stay as bytes; every
/// other path yields text.
#[derive(Clone, PartialEq, Eq)]
pub enum DecodedSecret {
    /// Text value
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl DecodedSecret {
    /// Text value, if this is text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }
}

impl std::fmt::Debug for DecodedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text([REDACTED])"),
            Self::Bytes(bytes) => write!(f, "Bytes([REDACTED; {} bytes])", bytes.len()),
        }
    }
}

/// Standard alphabet with canonical padding; unused bits in the final symbol
/// are ignored rather than rejected.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

const fn is_base64_symbol(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b'=')
}

/// Decode a backend envelope into a secret value.
///
/// Text payloads are returned verbatim. Binary payloads are base64-decoded
/// and then character-decoded, each step gated by `options`. Bytes outside
/// the base64 alphabet are skipped; padding must still be correct.
///
/// # Errors
///
/// Returns [`SecretError::Base64`] or [`SecretError::Encoding`] when the
/// corresponding step fails.
pub fn decode_envelope(envelope: SecretEnvelope, options: &DecodeOptions) -> Result<DecodedSecret> {
    let mut payload = match envelope {
        SecretEnvelope::Text(text) => return Ok(DecodedSecret::Text(text)),
        SecretEnvelope::Binary(bytes) => bytes,
    };

    if options.base64_decode {
        payload.retain(|&b| is_base64_symbol(b));
        payload = LENIENT_BASE64
            .decode(&payload)
            .map_err(|source| SecretError::Base64 { source })?;
    }

    if options.bytes_decode {
        return options.encoding.decode(payload).map(DecodedSecret::Text);
    }

    Ok(DecodedSecret::Bytes(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const SECRET: &str = "MY_DUMMY_SECRET";

    fn binary_envelope() -> SecretEnvelope {
        SecretEnvelope::Binary(STANDARD.encode(SECRET).into_bytes())
    }

    #[test]
    fn test_text_envelope_ignores_flags() {
        for (base64_decode, bytes_decode) in [(true, true), (false, false), (true, false)] {
            let options = DecodeOptions {
                base64_decode,
                bytes_decode,
                encoding: TextEncoding::Ascii,
            };
            let decoded =
                decode_envelope(SecretEnvelope::Text("bm90IGRlY29kZWQ=".to_string()), &options)
                    .unwrap();
            assert_eq!(decoded, DecodedSecret::Text("bm90IGRlY29kZWQ=".to_string()));
        }
    }

    #[test]
    fn test_binary_default_options() {
        let decoded = decode_envelope(binary_envelope(), &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_text(), Some(SECRET));
    }

    #[test]
    fn test_binary_without_bytes_decode_returns_bytes() {
        let options = DecodeOptions {
            bytes_decode: false,
            ..DecodeOptions::default()
        };
        let decoded = decode_envelope(binary_envelope(), &options).unwrap();
        assert_eq!(decoded, DecodedSecret::Bytes(SECRET.as_bytes().to_vec()));
        assert!(decoded.as_text().is_none());
    }

    #[test]
    fn test_binary_without_base64_decode_returns_base64_text() {
        let options = DecodeOptions {
            base64_decode: false,
            ..DecodeOptions::default()
        };
        let decoded = decode_envelope(binary_envelope(), &options).unwrap();
        let text = decoded.as_text().unwrap();
        assert_eq!(STANDARD.decode(text).unwrap(), SECRET.as_bytes());
    }

    #[test]
    fn test_binary_without_any_decoding_is_identity() {
        let options = DecodeOptions {
            base64_decode: false,
            bytes_decode: false,
            ..DecodeOptions::default()
        };
        let raw = vec![0x00, 0xff, 0x10, b'a'];
        let decoded = decode_envelope(SecretEnvelope::Binary(raw.clone()), &options).unwrap();
        assert_eq!(decoded, DecodedSecret::Bytes(raw));
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let envelope = SecretEnvelope::Binary(b"TVlfRFVNTVlf\nU0VDUkVU\n".to_vec());
        let decoded = decode_envelope(envelope, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_text(), Some(SECRET));
    }

    #[test]
    fn test_base64_ignores_unused_trailing_bits() {
        let envelope = SecretEnvelope::Binary(b"QR==".to_vec());
        let decoded = decode_envelope(envelope, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_text(), Some("A"));
    }

    #[test]
    fn test_base64_skips_non_alphabet_bytes() {
        let envelope = SecretEnvelope::Binary(b"TVlf*RFVN".to_vec());
        let decoded = decode_envelope(envelope, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.as_text(), Some("MY_DUM"));
    }

    #[test]
    fn test_base64_missing_padding_fails() {
        let envelope = SecretEnvelope::Binary(b"QQ".to_vec());
        let result = decode_envelope(envelope, &DecodeOptions::default());
        assert!(matches!(result, Err(SecretError::Base64 { .. })));
    }

    #[test]
    fn test_invalid_base64_fails() {
        let envelope = SecretEnvelope::Binary(b"not*base64!".to_vec());
        let result = decode_envelope(envelope, &DecodeOptions::default());
        assert!(matches!(result, Err(SecretError::Base64 { .. })));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let envelope = SecretEnvelope::Binary(STANDARD.encode([0xc3, 0x28]).into_bytes());
        let result = decode_envelope(envelope, &DecodeOptions::default());
        assert!(matches!(
            result,
            Err(SecretError::Encoding { encoding: "utf-8", .. })
        ));
    }

    #[test]
    fn test_latin1_decoding() {
        let options = DecodeOptions {
            encoding: TextEncoding::Latin1,
            ..DecodeOptions::default()
        };
        let envelope = SecretEnvelope::Binary(STANDARD.encode([b'c', b'a', b'f', 0xe9]).into_bytes());
        let decoded = decode_envelope(envelope, &options).unwrap();
        assert_eq!(decoded.as_text(), Some("caf\u{e9}"));
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let err = TextEncoding::Ascii.decode(vec![b'o', b'k', 0x80]).unwrap_err();
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_utf16_decoding() {
        assert_eq!(
            TextEncoding::Utf16Le.decode(vec![b'h', 0, b'i', 0]).unwrap(),
            "hi"
        );
        assert_eq!(
            TextEncoding::Utf16Be.decode(vec![0, b'h', 0, b'i']).unwrap(),
            "hi"
        );
        assert!(TextEncoding::Utf16Le.decode(vec![b'h']).is_err());
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("utf_8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("latin1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!(
            "ISO-8859-1".parse::<TextEncoding>().unwrap(),
            TextEncoding::Latin1
        );
        assert_eq!(
            "utf-16-be".parse::<TextEncoding>().unwrap(),
            TextEncoding::Utf16Be
        );
        assert!(matches!(
            "ebcdic".parse::<TextEncoding>(),
            Err(SecretError::UnknownEncoding { .. })
        ));
    }

    #[test]
    fn test_encoding_serde() {
        let json = serde_json::to_string(&TextEncoding::Latin1).unwrap();
        assert_eq!(json, "\"latin-1\"");
        let parsed: TextEncoding = serde_json::from_str("\"ascii\"").unwrap();
        assert_eq!(parsed, TextEncoding::Ascii);
        assert!(serde_json::from_str::<TextEncoding>("\"klingon\"").is_err());
    }
}

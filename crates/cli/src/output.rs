//! Rendering of secret values to stdout

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use get_aws_secret::SecretValue;
use serde::Serialize;
use std::io::{self, Write};

/// How the secret is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Text as-is, JSON pretty-printed, bytes raw
    Text,
    /// A JSON envelope with the secret id and value
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    secret_id: &'a str,
    value: serde_json::Value,
}

/// Write `value` to `out` in the requested format
pub fn render(
    out: &mut impl Write,
    secret_id: &str,
    value: SecretValue,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => match value {
            SecretValue::Text(text) => writeln!(out, "{text}"),
            SecretValue::Bytes(bytes) => out.write_all(&bytes),
            SecretValue::Json(doc) => {
                serde_json::to_writer_pretty(&mut *out, &doc)?;
                writeln!(out)
            }
        },
        OutputFormat::Json => {
            let value = match value {
                SecretValue::Text(text) => serde_json::Value::String(text),
                SecretValue::Bytes(bytes) => serde_json::Value::String(STANDARD.encode(bytes)),
                SecretValue::Json(doc) => doc,
            };
            serde_json::to_writer(&mut *out, &JsonOutput { secret_id, value })?;
            writeln!(out)
        }
    }?;
    out.flush()
}

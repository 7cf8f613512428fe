//! Secret retrieval from AWS Secrets Manager
//!
//! Fetches a secret by name or ARN, decodes binary payloads, optionally parses
//! the value as JSON and optionally memoizes the decoded value in a process
//! environment variable so repeated lookups skip the network.
//!
//! # Example
//!
//! ```ignore
//! use get_aws_secret::{GetSecretOptions, SecretValue, get_secret};
//!
//! let options = GetSecretOptions::default().with_memoize(true);
//! match get_secret("prod/db/password", &options, None).await? {
//!     SecretValue::Text(password) => connect(&password),
//!     SecretValue::Json(doc) => connect(doc["password"].as_str().unwrap_or_default()),
//!     SecretValue::Bytes(raw) => connect_with_key(&raw),
//! }
//! ```
//!
//! Callers without an async runtime use the [`blocking`] module instead.

mod accessor;
pub mod blocking;
mod cache;
mod client;
mod decode;
mod json;

pub use accessor::{
    GetSecretOptions, SecretAccessor, get_secret, get_secret_fix_args, get_secret_with_cache,
};
pub use cache::{EnvCache, MemoryCache, SecretCache};
pub use client::{AwsSecretsClient, SecretClient, SecretEnvelope, new_client, resolve_client};
pub use decode::{DecodeOptions, DecodedSecret, TextEncoding, decode_envelope};
pub use json::{JsonParse, SecretValue, parse_json, return_secret};

use thiserror::Error;

/// Result alias for secret retrieval
pub type Result<T> = std::result::Result<T, SecretError>;

/// Error types for secret retrieval
#[derive(Debug, Error)]
pub enum SecretError {
    /// The backend rejected or failed the request (not found, access denied, network, ...)
    #[error("Failed to fetch secret '{secret_id}': {source}")]
    Backend {
        /// Secret name or ARN that was requested
        secret_id: String,
        /// Error raised by the backend client, unchanged
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The backend response carried neither a string nor a binary payload
    #[error("Secret '{secret_id}' has neither a string nor a binary value")]
    EmptyEnvelope {
        /// Secret name or ARN that was requested
        secret_id: String,
    },

    /// Binary payload is not valid base64
    #[error("Secret binary is not valid base64: {source}")]
    Base64 {
        /// Underlying decoder error
        #[source]
        source: base64::DecodeError,
    },

    /// Bytes could not be decoded with the requested encoding
    #[error("Secret bytes are not valid {encoding}: {message}")]
    Encoding {
        /// Codec name
        encoding: &'static str,
        /// Decoder message
        message: String,
    },

    /// Requested text encoding is not supported
    #[error("Unknown text encoding: {encoding}")]
    UnknownEncoding {
        /// The encoding name that was requested
        encoding: String,
    },

    /// The memoization cache refused a write
    #[error("Failed to memoize secret '{key}': {reason}")]
    CacheWrite {
        /// Cache key (the secret identifier)
        key: String,
        /// Why the write was refused
        reason: String,
    },

    /// The blocking entry points could not start a runtime
    #[error("Failed to start async runtime: {source}")]
    Runtime {
        /// I/O error from the runtime builder
        #[source]
        source: std::io::Error,
    },
}

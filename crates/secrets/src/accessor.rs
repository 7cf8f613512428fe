//! The fetch, decode, memoize and JSON pipeline

use crate::{
    DecodeOptions, DecodedSecret, EnvCache, Result, SecretCache, SecretClient, SecretValue,
    TextEncoding, decode_envelope, resolve_client, return_secret,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Options for a single secret lookup.
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides:
///
/// ```ignore
/// let options: GetSecretOptions =
///     serde_json::from_str(r#"{"memoize": true, "versionStage": "AWSPREVIOUS"}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetSecretOptions {
    /// Read and write the decoded value through the cache (default: false)
    pub memoize: bool,

    /// Version ID to fetch (default: latest)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Version stage to fetch (default: the backend's, `AWSCURRENT`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_stage: Option<String>,

    /// Base64-decode binary secrets (default: true)
    pub base64_decode: bool,

    /// Decode binary secrets into text (default: true)
    pub bytes_decode: bool,

    /// Encoding for `bytes_decode` (default: utf-8)
    pub encoding: TextEncoding,

    /// Parse the decoded text as JSON when possible (default: true)
    pub load_json: bool,
}

impl Default for GetSecretOptions {
    fn default() -> Self {
        Self {
            memoize: false,
            version_id: None,
            version_stage: None,
            base64_decode: true,
            bytes_decode: true,
            encoding: TextEncoding::Utf8,
            load_json: true,
        }
    }
}

impl GetSecretOptions {
    /// Enable or disable memoization
    #[must_use]
    pub const fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Fetch a specific version ID
    #[must_use]
    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Fetch a specific version stage
    #[must_use]
    pub fn with_version_stage(mut self, version_stage: impl Into<String>) -> Self {
        self.version_stage = Some(version_stage.into());
        self
    }

    /// Toggle base64 decoding of binary secrets
    #[must_use]
    pub const fn with_base64_decode(mut self, base64_decode: bool) -> Self {
        self.base64_decode = base64_decode;
        self
    }

    /// Toggle bytes-to-text decoding of binary secrets
    #[must_use]
    pub const fn with_bytes_decode(mut self, bytes_decode: bool) -> Self {
        self.bytes_decode = bytes_decode;
        self
    }

    /// Set the text encoding for binary secrets
    #[must_use]
    pub const fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Toggle JSON parsing of the result
    #[must_use]
    pub const fn with_load_json(mut self, load_json: bool) -> Self {
        self.load_json = load_json;
        self
    }

    /// The envelope decoding subset of these options
    #[must_use]
    pub const fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            base64_decode: self.base64_decode,
            bytes_decode: self.bytes_decode,
            encoding: self.encoding,
        }
    }
}

/// Fetch a secret, memoizing through the process environment.
///
/// `client` is used as-is when supplied; otherwise a default Secrets Manager
/// client is built for this call.
///
/// # Errors
///
/// Returns the backend error on fetch failure, or a decoding error for
/// binary secrets that fail base64 or text decoding.
pub async fn get_secret(
    secret_id: &str,
    options: &GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
) -> Result<SecretValue> {
    get_secret_with_cache(secret_id, options, client, &EnvCache).await
}

/// Fetch a secret, memoizing through `cache`.
///
/// With `options.memoize` set, a cached value short-circuits the backend and
/// a fetched value is written back. Without it the cache is neither read nor
/// written. JSON parsing runs on every path, cached or not.
///
/// # Errors
///
/// See [`get_secret`]. Also fails when the cache refuses a write.
#[instrument(skip_all, fields(secret_id = %secret_id, memoize = options.memoize))]
pub async fn get_secret_with_cache(
    secret_id: &str,
    options: &GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
    cache: &dyn SecretCache,
) -> Result<SecretValue> {
    let decoded = if options.memoize {
        if let Some(cached) = cache.get(secret_id) {
            tracing::debug!("Using memoized secret");
            DecodedSecret::Text(cached)
        } else {
            let decoded = fetch_decoded(secret_id, options, client).await?;
            memoize(cache, secret_id, &decoded)?;
            decoded
        }
    } else {
        fetch_decoded(secret_id, options, client).await?
    };

    Ok(return_secret(decoded, options.load_json))
}

async fn fetch_decoded(
    secret_id: &str,
    options: &GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
) -> Result<DecodedSecret> {
    let client = resolve_client(client).await;

    tracing::debug!(
        provider = client.provider_name(),
        version_id = ?options.version_id,
        version_stage = ?options.version_stage,
        "Fetching secret"
    );

    let envelope = client
        .fetch(
            secret_id,
            options.version_id.as_deref(),
            options.version_stage.as_deref(),
        )
        .await?;

    tracing::trace!(kind = envelope.kind(), "Decoding secret envelope");
    decode_envelope(envelope, &options.decode_options())
}

fn memoize(cache: &dyn SecretCache, secret_id: &str, decoded: &DecodedSecret) -> Result<()> {
    match decoded {
        DecodedSecret::Text(text) => {
            cache.set(secret_id, text)?;
            tracing::debug!("Memoized secret");
        }
        DecodedSecret::Bytes(bytes) => {
            tracing::warn!(
                len = bytes.len(),
                "Binary secret was not decoded to text and cannot be memoized"
            );
        }
    }
    Ok(())
}

/// A secret lookup with options bound ahead of time.
///
/// Each [`get`](SecretAccessor::get) forwards to [`get_secret_with_cache`]
/// with the bound options, client and cache.
///
/// ```ignore
/// let secrets = SecretAccessor::new(GetSecretOptions::default().with_memoize(true));
/// let token = secrets.get("ci/github-token").await?;
/// ```
#[derive(Clone)]
pub struct SecretAccessor {
    options: GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
    cache: Arc<dyn SecretCache>,
}

impl std::fmt::Debug for SecretAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAccessor")
            .field("options", &self.options)
            .field(
                "client",
                &self.client.as_ref().map(|client| client.provider_name()),
            )
            .finish_non_exhaustive()
    }
}

impl Default for SecretAccessor {
    fn default() -> Self {
        Self::new(GetSecretOptions::default())
    }
}

impl SecretAccessor {
    /// Bind `options`, memoizing through the process environment
    #[must_use]
    pub fn new(options: GetSecretOptions) -> Self {
        Self {
            options,
            client: None,
            cache: Arc::new(EnvCache),
        }
    }

    /// Bind a client instead of building a default one per lookup
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn SecretClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Memoize through `cache` instead of the process environment
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn SecretCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The bound options
    #[must_use]
    pub const fn options(&self) -> &GetSecretOptions {
        &self.options
    }

    /// Fetch `secret_id` with the bound options.
    ///
    /// # Errors
    ///
    /// See [`get_secret`].
    pub async fn get(&self, secret_id: &str) -> Result<SecretValue> {
        get_secret_with_cache(
            secret_id,
            &self.options,
            self.client.clone(),
            self.cache.as_ref(),
        )
        .await
    }
}

/// Bind `options` and `client` for later lookups by identifier only.
#[must_use]
pub fn get_secret_fix_args(
    options: GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
) -> SecretAccessor {
    let accessor = SecretAccessor::new(options);
    match client {
        Some(client) => accessor.with_client(client),
        None => accessor,
    }
}

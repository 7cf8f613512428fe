//! Backend client seam and the AWS Secrets Manager implementation

use crate::{Result, SecretError};
use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use std::sync::Arc;

/// Raw secret payload as returned by the backend.
///
/// Exactly one of a string or a binary payload; Secrets Manager never
/// returns both for the same version.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretEnvelope {
    /// `SecretString` payload
    Text(String),
    /// `SecretBinary` payload
    Binary(Vec<u8>),
}

impl SecretEnvelope {
    /// Extract the payload from a `GetSecretValue` response.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::EmptyEnvelope`] when the response has neither
    /// `SecretString` nor `SecretBinary`.
    pub fn from_output(secret_id: &str, output: &GetSecretValueOutput) -> Result<Self> {
        if let Some(text) = output.secret_string() {
            return Ok(Self::Text(text.to_string()));
        }

        if let Some(blob) = output.secret_binary() {
            return Ok(Self::Binary(blob.as_ref().to_vec()));
        }

        Err(SecretError::EmptyEnvelope {
            secret_id: secret_id.to_string(),
        })
    }

    /// Payload kind, for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }
}

impl std::fmt::Debug for SecretEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text([REDACTED])"),
            Self::Binary(bytes) => write!(f, "Binary([REDACTED; {} bytes])", bytes.len()),
        }
    }
}

/// A backend able to fetch a single secret version.
///
/// Any type implementing this trait is a valid client handle; there is no
/// runtime validity check beyond the type bound.
#[async_trait]
pub trait SecretClient: Send + Sync {
    /// Fetch the secret envelope for `secret_id`.
    ///
    /// `None` for `version_id`/`version_stage` lets the backend pick its
    /// defaults (latest version, `AWSCURRENT`).
    async fn fetch(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&str>,
    ) -> Result<SecretEnvelope>;

    /// Provider identifier for logging.
    fn provider_name(&self) -> &'static str;
}

/// Secrets Manager client backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct AwsSecretsClient {
    client: Client,
}

impl AwsSecretsClient {
    /// Build a client from the default AWS configuration chain.
    ///
    /// Region and credentials are discovered by `aws-config` (environment,
    /// profile files, instance metadata). Nothing is validated here; bad
    /// credentials surface on the first fetch.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Wrap an already configured SDK client
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Access the underlying SDK client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SecretClient for AwsSecretsClient {
    async fn fetch(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
        version_stage: Option<&str>,
    ) -> Result<SecretEnvelope> {
        let mut request = self.client.get_secret_value().secret_id(secret_id);

        if let Some(version_id) = version_id {
            request = request.version_id(version_id);
        }

        if let Some(version_stage) = version_stage {
            request = request.version_stage(version_stage);
        }

        let response = request.send().await.map_err(|e| SecretError::Backend {
            secret_id: secret_id.to_string(),
            source: Box::new(e),
        })?;

        SecretEnvelope::from_output(secret_id, &response)
    }

    fn provider_name(&self) -> &'static str {
        "aws"
    }
}

/// Create a default-configured Secrets Manager client
pub async fn new_client() -> AwsSecretsClient {
    AwsSecretsClient::from_env().await
}

/// Return the supplied client unchanged, or build a default one.
pub async fn resolve_client(client: Option<Arc<dyn SecretClient>>) -> Arc<dyn SecretClient> {
    match client {
        Some(client) => client,
        None => {
            tracing::debug!("No client supplied, building default Secrets Manager client");
            Arc::new(new_client().await)
        }
    }
}

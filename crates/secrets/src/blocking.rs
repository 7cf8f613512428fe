//! Synchronous entry points
//!
//! Each call drives the async pipeline to completion on a fresh
//! current-thread Tokio runtime, blocking the calling thread for the duration
//! of the fetch. Do not call these from inside an async runtime.

use crate::{GetSecretOptions, Result, SecretAccessor, SecretClient, SecretError, SecretValue};
use std::future::Future;
use std::sync::Arc;

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| SecretError::Runtime { source })?;
    Ok(runtime.block_on(future))
}

/// Blocking form of [`crate::get_secret`].
///
/// # Errors
///
/// See [`crate::get_secret`]; also fails if the runtime cannot start.
///
/// # Panics
///
/// Panics when called from within an async runtime.
pub fn get_secret(
    secret_id: &str,
    options: &GetSecretOptions,
    client: Option<Arc<dyn SecretClient>>,
) -> Result<SecretValue> {
    block_on(crate::get_secret(secret_id, options, client))?
}

impl SecretAccessor {
    /// Blocking form of [`SecretAccessor::get`].
    ///
    /// # Errors
    ///
    /// See [`crate::get_secret`]; also fails if the runtime cannot start.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime.
    pub fn get_blocking(&self, secret_id: &str) -> Result<SecretValue> {
        block_on(self.get(secret_id))?
    }
}

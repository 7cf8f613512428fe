//! Memoization stores for decoded secrets

use crate::{Result, SecretError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value store used to memoize decoded secrets, keyed by secret identifier.
pub trait SecretCache: Send + Sync {
    /// Look up a memoized value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a decoded value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::CacheWrite`] when the store cannot hold the
    /// key or value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Memoizes secrets in the process environment.
///
/// Values live until the process exits and are inherited by child processes.
/// There is no synchronization around concurrent lookups of the same key:
/// two tasks missing at once will both fetch, and the last write wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCache;

impl EnvCache {
    /// Create a cache over the process environment
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn check_writable(key: &str, value: &str) -> Result<()> {
        let reason = if key.is_empty() {
            "key is empty"
        } else if key.contains('=') {
            "key contains '='"
        } else if key.contains('\0') || value.contains('\0') {
            "key or value contains a NUL byte"
        } else {
            return Ok(());
        };

        Err(SecretError::CacheWrite {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    }
}

impl SecretCache for EnvCache {
    fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() || key.contains(['=', '\0']) {
            return None;
        }
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::check_writable(key, value)?;

        // SAFETY: mutating the environment races with concurrent readers in
        // other threads. Memoization is opt-in and callers accept that the
        // environment is shared process state.
        #[expect(unsafe_code, reason = "Rust 2024 marks environment mutation unsafe")]
        unsafe {
            std::env::set_var(key, value);
        }
        Ok(())
    }
}

/// In-process cache isolated from the environment
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with `entries`
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of memoized entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Check if nothing has been memoized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| SecretError::CacheWrite {
            key: key.to_string(),
            reason: "cache lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

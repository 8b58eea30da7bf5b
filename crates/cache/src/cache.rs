//! Key-value cache abstraction.
//!
//! Values are strings with a time-to-live. [`CacheExt`] layers typed JSON
//! access and pattern deletion on top of any backend.

use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use glob::Pattern;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// A string key-value store with expiry and wildcard key scanning
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Removes the given keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// Lists live keys matching `pattern`, where `*` matches any run of characters
    async fn scan(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

/// Typed helpers available on every [`Cache`]
#[async_trait]
pub trait CacheExt: Cache {
    async fn get_json<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> CacheResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw, ttl).await
    }

    /// Deletes every key matching `pattern`
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let keys = self.scan(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.delete(&keys).await
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

/// Compiles a Redis-style key pattern (`*`, `?`, `[...]`)
pub fn compile_pattern(pattern: &str) -> CacheResult<Pattern> {
    Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern(format!("{pattern}: {e}")))
}

/// Matches `key` against `pattern`
pub fn glob_match(pattern: &str, key: &str) -> CacheResult<bool> {
    Ok(compile_pattern(pattern)?.matches(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        let m = |p: &str, k: &str| glob_match(p, k).unwrap();
        assert!(m("accounts:user:42:*", "accounts:user:42:20:0"));
        assert!(!m("accounts:user:42:*", "accounts:user:421:20:0"));
        assert!(m("accounts:all:*", "accounts:all:"));
        assert!(m("account:id:?", "account:id:7"));
        assert!(m("*", "anything"));
        assert!(m("a*b*c", "aXXbYYc"));
        assert!(!m("a*b*c", "aXXbYY"));
        assert!(m("accounts:active", "accounts:active"));
        assert!(!m("accounts:active", "accounts:active:1"));
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let err = glob_match("accounts:[", "accounts:[").unwrap_err();
        assert!(matches!(err, CacheError::InvalidPattern(_)));
    }
}

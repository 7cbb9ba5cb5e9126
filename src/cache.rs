use std::collections::HashMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use tokio::sync::RwLock;

struct StoredEntry<T> {
    value: T,
    expires_at: Instant,
}

/// In-process cache with a per-entry time-to-live.
///
/// Holds fetched certificate chains keyed by their chain URL. Values are
/// cloned on read, so store cheaply clonable data (e.g. `Arc`s).
pub struct TtlCache<T> {
    entries: RwLock<HashMap<String, StoredEntry<T>>>,
}

impl<T: Clone + Send + Sync> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put(&self, key: &str, value: T, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?;
        let entry = StoredEntry { value, expires_at };

        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Option<T> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    tracing::debug!("Key found and still fresh");
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            tracing::debug!("Key found but expired");
            self.remove(key).await;
        } else {
            tracing::debug!("Key not found");
        }
        None
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl<T: Clone + Send + Sync> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

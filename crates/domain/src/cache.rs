//! In-process TTL cache with sliding and absolute expiration.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

/// Expiration policy applied to every entry.
///
/// An entry expires when it has been idle longer than `sliding` or when it
/// is older than `absolute`, whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub sliding: Duration,
    pub absolute: Duration,
}

impl CachePolicy {
    pub fn new(sliding: Duration, absolute: Duration) -> Self {
        Self { sliding, absolute }
    }
}

struct Entry<V> {
    value: V,
    created: Instant,
    last_access: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant, policy: &CachePolicy) -> bool {
        now.duration_since(self.created) >= policy.absolute
            || now.duration_since(self.last_access) >= policy.sliding
    }
}

/// Keyed cache whose values are produced by an async loader on miss.
///
/// Population is not exclusive: concurrent misses on the same key each run
/// the loader and the last insert wins.
pub struct TtlCache<K, V> {
    name: &'static str,
    policy: CachePolicy,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            name,
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Returns a live entry, refreshing its sliding window.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(key) {
            Some(entry) if entry.is_expired(now, &self.policy) => {
                entries.remove(key);
                None
            }
            Some(entry) => {
                entry.last_access = now;
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            Entry {
                value,
                created: now,
                last_access: now,
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }

    /// Returns the cached value or runs `loader` and caches its result.
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub async fn get_or_load<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            metrics::counter!("cache_hits_total", "cache" => self.name).increment(1);
            return Ok(value);
        }

        metrics::counter!("cache_misses_total", "cache" => self.name).increment(1);
        let value = loader().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

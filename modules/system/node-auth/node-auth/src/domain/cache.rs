//! TTL-keyed decision cache.
//!
//! Expiry is checked on every read, so an expired entry is never returned
//! even if it is still physically present. Every write also sweeps expired
//! entries, in expiry order, so entries nobody reads again do not linger.
//! When a size bound is configured and the cache is still full after the
//! sweep, the entry closest to its own expiry is evicted.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

struct Entries<V> {
    by_key: HashMap<String, CacheEntry<V>>,
    /// Same keys as `by_key`, ordered by expiry.
    by_expiry: BTreeSet<(Instant, String)>,
}

impl<V> Entries<V> {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            by_expiry: BTreeSet::new(),
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(entry) = self.by_key.remove(key) {
            self.by_expiry.remove(&(entry.expires_at, key.to_owned()));
        }
    }

    fn insert(&mut self, key: String, value: V, expires_at: Instant) {
        self.remove(&key);
        self.by_expiry.insert((expires_at, key.clone()));
        self.by_key.insert(key, CacheEntry { value, expires_at });
    }

    /// Drop entries expired at `now`, returning how many were dropped.
    fn purge_expired(&mut self, now: Instant) -> usize {
        let mut dropped = 0;
        while self.by_expiry.first().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, key)) = self.by_expiry.pop_first() {
                self.by_key.remove(&key);
                dropped += 1;
            }
        }
        dropped
    }

    fn evict_soonest(&mut self) {
        if let Some((_, key)) = self.by_expiry.pop_first() {
            self.by_key.remove(&key);
        }
    }
}

/// Concurrent key/value store with a per-entry time to live.
///
/// Values are cloned out on read; callers never hold a reference into the map.
pub struct TtlCache<V> {
    entries: RwLock<Entries<V>>,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `max_entries` entries (`0` = unbounded).
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::new()),
            max_entries,
        }
    }

    /// Return the live value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.by_key.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Expired: drop it, unless a writer replaced it in the meantime.
        let mut entries = self.entries.write();
        if entries.by_key.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        None
    }

    /// Store `value` under `key` for `ttl`. A zero `ttl` stores nothing.
    pub fn put(&self, key: String, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(ttl) else {
            tracing::warn!(?ttl, "cache ttl overflows the clock, entry not stored");
            return;
        };

        let mut entries = self.entries.write();
        let swept = entries.purge_expired(now);
        if swept > 0 {
            tracing::trace!(swept, "dropped expired cache entries");
        }
        if self.max_entries > 0
            && !entries.by_key.contains_key(&key)
            && entries.by_key.len() >= self.max_entries
        {
            tracing::debug!(
                max_entries = self.max_entries,
                "cache full, evicting entry closest to expiry"
            );
            entries.evict_soonest();
        }
        entries.insert(key, value, expires_at);
    }

    /// Number of entries that have not expired yet.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .by_key
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Expiring key-value store abstraction.
//!
//! Stream tokens and the enrollment cache go through [`KvStore`] rather than
//! a concrete map so the backing store can be swapped for a shared networked
//! cache when running more than one server process. The in-process
//! implementation is [`MemoryKvStore`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Expiring key-value store.
///
/// `get` must be safe under concurrent reads and must not mutate state:
/// expiry is absolute from `put`, never sliding, and a read of an expired
/// key is indistinguishable from a read of a key that never existed.
pub trait KvStore: Send + Sync {
    /// Read a live value. Expired and unknown keys both return `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl` from now, replacing any previous
    /// value and its deadline.
    fn put(&self, key: &str, value: String, ttl: Duration);

    /// Remove a key. Removing an unknown key is a no-op.
    fn delete(&self, key: &str);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`KvStore`] backed by a concurrent map.
///
/// Expired entries are invisible to `get` immediately; the occupied slots
/// are reclaimed by [`MemoryKvStore::purge_expired`], typically driven by
/// [`start_cleanup_task`].
#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, Entry>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Remove expired entries and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Start a background task that periodically purges expired entries.
pub fn start_cleanup_task(
    store: Arc<MemoryKvStore>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "Purged expired cache entries");
            }
        }
    })
}

//! Time-bounded response cache keyed by request fingerprint.
//!
//! Freshness is decided by [`ResponseCache::get`] against an injected
//! [`Clock`]: an entry is served while `now - created_at < ttl`. The backing
//! store is size-capped and sweeps expired entries on its own, so stale
//! entries never need explicit eviction here.

use moka::future::Cache;
use std::{
    fmt::{self, Debug},
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use crate::model::ResponsePayload;

/// Canonical fingerprint of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key from the normalized request dimensions.
    ///
    /// The parts are encoded as a JSON array, so no two distinct tuples share
    /// a key regardless of the characters they contain.
    pub fn new(
        place: &str,
        language: &str,
        json_flag: &str,
        theme: &str,
        timezone: &str,
        size: &str,
    ) -> Self {
        let parts = [place, language, json_flag, theme, timezone, size];
        let encoded = serde_json::to_string(&parts).unwrap_or_else(|_| parts.join("\u{1f}"));
        CacheKey(encoded)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { origin: Instant::now(), elapsed_ms: AtomicU64::new(0) }
    }

    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    created_at: Instant,
    payload: ResponsePayload,
}

#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl ResponseCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder().max_capacity(max_entries).time_to_live(ttl).build();
        Self { entries, ttl, clock }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now().saturating_duration_since(entry.created_at) < self.ttl
    }

    /// Payload stored under `key`, unless it is missing or expired.
    pub async fn get(&self, key: &CacheKey) -> Option<ResponsePayload> {
        self.entries.get(key).await.filter(|e| self.is_fresh(e)).map(|e| e.payload)
    }

    /// Store `payload` under `key`, replacing whatever was there.
    pub async fn put(&self, key: CacheKey, payload: ResponsePayload) {
        let entry = CacheEntry { created_at: self.clock.now(), payload };
        self.entries.insert(key, entry).await;
    }

    /// Return the fresh payload for `key`, or compute it with `init` and store it.
    ///
    /// Concurrent callers missing on the same key share a single `init` run.
    /// Failures are handed to every waiter and are not cached.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        key: CacheKey,
        init: F,
    ) -> Result<ResponsePayload, E>
    where
        F: Future<Output = Result<ResponsePayload, E>>,
        E: Clone + Send + Sync + 'static,
    {
        match self.entries.get(&key).await {
            Some(entry) if self.is_fresh(&entry) => return Ok(entry.payload),
            Some(_) => self.entries.invalidate(&key).await,
            None => {}
        }

        let clock = Arc::clone(&self.clock);
        self.entries
            .try_get_with(key, async move {
                let payload = init.await?;
                Ok(CacheEntry { created_at: clock.now(), payload })
            })
            .await
            .map(|entry| entry.payload)
            .map_err(|err: Arc<E>| (*err).clone())
    }
}

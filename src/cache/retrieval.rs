//! Field-keyed TTL cache wrapping remote fetches
//!
//! A [`RetrievalCache`] stores one entry per field. An entry is either a
//! successful result or, when error caching is enabled, a failure marker that
//! suppresses new fetches for that field until the TTL runs out. Failures never
//! escape [`RetrievalCache::retrieve`]: they are reported to the configured
//! [`FailureSink`] and the caller's default is returned instead.
//!
//! Two concurrent misses on the same field will both run their fetch; the last
//! one to finish is what stays cached. There is no per-field locking.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::error::BattlefieldsError;
use crate::sink::FailureSink;

/// How long entries stay fresh and whether failures are remembered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Time-to-live for every entry. `Duration::ZERO` disables caching.
    pub ttl: Duration,
    /// Whether a failed fetch suppresses retries for one TTL window
    pub cache_errors: bool,
}

impl CachePolicy {
    /// Creates a policy with the given TTL and error caching setting
    pub fn new(ttl: Duration, cache_errors: bool) -> Self {
        Self { ttl, cache_errors }
    }

    /// A policy under which every call is a live fetch
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    /// Whether anything is stored at all
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

/// Generation counter shared by a family of caches
///
/// Entries remember the generation they were written in. Advancing the epoch
/// makes every entry in every cache sharing it stale at once.
#[derive(Debug, Clone, Default)]
pub struct CacheEpoch(Arc<AtomicU64>);

impl CacheEpoch {
    /// Creates an epoch starting at generation zero
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidates every entry written so far
    pub fn advance(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug)]
enum CacheState<V> {
    Ready(Arc<V>),
    Failed,
}

/// One cached field: a result or a failure marker, plus when it was written
#[derive(Debug)]
struct CacheEntry<V> {
    state: CacheState<V>,
    stored_at: Instant,
    epoch: u64,
}

enum Lookup<V> {
    Hit(Arc<V>),
    CoolingDown,
    Miss,
}

/// Concurrent TTL cache for one value type
pub struct RetrievalCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    policy: CachePolicy,
    epoch: CacheEpoch,
    sink: Arc<dyn FailureSink>,
}

impl<V> fmt::Debug for RetrievalCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalCache")
            .field("policy", &self.policy)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<V: Send + Sync> RetrievalCache<V> {
    /// Creates an empty cache
    pub fn new(policy: CachePolicy, epoch: CacheEpoch, sink: Arc<dyn FailureSink>) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
            epoch,
            sink,
        }
    }

    /// The policy this cache was created with
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Whether a call for `field` right now would be answered without fetching
    pub fn is_valid(&self, field: &str) -> bool {
        !matches!(self.lookup(field), Lookup::Miss)
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry in this cache
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn lookup(&self, field: &str) -> Lookup<V> {
        if !self.policy.is_enabled() {
            return Lookup::Miss;
        }
        let Some(entry) = self.entries.get(field) else {
            return Lookup::Miss;
        };
        if entry.epoch != self.epoch.current() || entry.stored_at.elapsed() >= self.policy.ttl {
            return Lookup::Miss;
        }
        match &entry.state {
            CacheState::Ready(value) => Lookup::Hit(Arc::clone(value)),
            CacheState::Failed if self.policy.cache_errors => Lookup::CoolingDown,
            CacheState::Failed => Lookup::Miss,
        }
    }

    /// Returns the cached value for `field`, or runs `fetch` and caches it
    ///
    /// Returns `None` when the fetch fails or when the field is still cooling
    /// down from an earlier failure. A failure is reported to the sink and
    /// never propagated.
    pub async fn try_retrieve<F, Fut>(&self, field: &str, fetch: F) -> Option<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, BattlefieldsError>>,
    {
        match self.lookup(field) {
            Lookup::Hit(value) => {
                tracing::debug!(field, "cache hit");
                return Some(value);
            }
            Lookup::CoolingDown => {
                tracing::debug!(field, "skipping fetch during failure cooldown");
                return None;
            }
            Lookup::Miss => {}
        }

        match fetch().await {
            Ok(value) => {
                let value = Arc::new(value);
                if self.policy.is_enabled() {
                    self.entries.insert(
                        field.to_string(),
                        CacheEntry {
                            state: CacheState::Ready(Arc::clone(&value)),
                            stored_at: Instant::now(),
                            epoch: self.epoch.current(),
                        },
                    );
                }
                Some(value)
            }
            Err(error) => {
                self.sink.report(&error);
                if self.policy.is_enabled() && self.policy.cache_errors {
                    self.mark_failed(field);
                }
                None
            }
        }
    }

    /// Like [`try_retrieve`](Self::try_retrieve), substituting `default()` on failure
    pub async fn retrieve<F, Fut, D>(&self, field: &str, fetch: F, default: D) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, BattlefieldsError>>,
        D: FnOnce() -> V,
    {
        match self.try_retrieve(field, fetch).await {
            Some(value) => value,
            None => Arc::new(default()),
        }
    }

    /// Records a failure unless a result from this epoch is still stored
    fn mark_failed(&self, field: &str) {
        let marker = CacheEntry {
            state: CacheState::Failed,
            stored_at: Instant::now(),
            epoch: self.epoch.current(),
        };
        match self.entries.entry(field.to_string()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get();
                if matches!(current.state, CacheState::Failed) || current.epoch != marker.epoch {
                    occupied.insert(marker);
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(marker);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const TTL: Duration = Duration::from_secs(60);

    fn create_cache(policy: CachePolicy) -> (RetrievalCache<u32>, Arc<Mutex<Vec<String>>>) {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink_log = reported.clone();
        let sink = move |e: &BattlefieldsError| sink_log.lock().unwrap().push(e.to_string());
        let cache = RetrievalCache::new(policy, CacheEpoch::new(), Arc::new(sink));
        (cache, reported)
    }

    async fn succeed(calls: &AtomicUsize, value: u32) -> Result<u32, BattlefieldsError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    async fn fail(calls: &AtomicUsize) -> Result<u32, BattlefieldsError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(BattlefieldsError::UpstreamRejected("down".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_served_from_cache_until_ttl() {
        let (cache, _) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        let first = cache.retrieve("kills-", || succeed(&calls, 7), || 0).await;
        assert_eq!(*first, 7);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        let second = cache.retrieve("kills-", || succeed(&calls, 8), || 0).await;
        assert_eq!(*second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        let third = cache.retrieve("kills-", || succeed(&calls, 9), || 0).await;
        assert_eq!(*third, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_fetches_every_time() {
        let (cache, _) = create_cache(CachePolicy::disabled());
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache.retrieve("wins-", || succeed(&calls, 1), || 0).await;
            cache.retrieve("wins-", || fail(&calls), || 0).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_cooldown_when_errors_cached() {
        let (cache, reported) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        let value = cache.retrieve("players-", || fail(&calls), || 42).await;
        assert_eq!(*value, 42);
        assert!(cache.is_valid("players-"));

        tokio::time::advance(TTL / 2).await;
        let value = cache.retrieve("players-", || succeed(&calls, 1), || 42).await;
        assert_eq!(*value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(TTL / 2).await;
        let value = cache.retrieve("players-", || succeed(&calls, 1), || 42).await;
        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(reported.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_suppress_retry_when_errors_not_cached() {
        let (cache, reported) = create_cache(CachePolicy::new(TTL, false));
        let calls = AtomicUsize::new(0);

        cache.retrieve("matches-", || fail(&calls), || 0).await;
        assert!(!cache.is_valid("matches-"));
        cache.retrieve("matches-", || fail(&calls), || 0).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(reported.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_stale_success_entry() {
        let (cache, _) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        cache.retrieve("emotes-", || succeed(&calls, 3), || 0).await;
        tokio::time::advance(TTL).await;

        let value = cache.retrieve("emotes-", || fail(&calls), || 0).await;
        assert_eq!(*value, 0);

        // The stale success is still there, so no cooldown applies.
        let value = cache.retrieve("emotes-", || succeed(&calls, 4), || 0).await;
        assert_eq!(*value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_cooldown_replaces_marker() {
        let (cache, _) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        cache.retrieve("server_list", || fail(&calls), || 0).await;
        tokio::time::advance(TTL).await;
        cache.retrieve("server_list", || succeed(&calls, 5), || 0).await;

        let value = cache.retrieve("server_list", || fail(&calls), || 0).await;
        assert_eq!(*value, 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advancing_epoch_invalidates_entries() {
        let epoch = CacheEpoch::new();
        let sink = Arc::new(|_: &BattlefieldsError| {});
        let cache: RetrievalCache<u32> = RetrievalCache::new(CachePolicy::new(TTL, true), epoch.clone(), sink);
        let calls = AtomicUsize::new(0);

        cache.retrieve("kills-&uuid=a", || succeed(&calls, 1), || 0).await;
        epoch.advance();
        assert!(!cache.is_valid("kills-&uuid=a"));

        let value = cache.retrieve("kills-&uuid=a", || succeed(&calls, 2), || 0).await;
        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_are_cached_independently() {
        let (cache, _) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        cache.retrieve("kills-&uuid=a", || succeed(&calls, 1), || 0).await;
        cache.retrieve("kills-&uuid=b", || fail(&calls), || 0).await;

        let a = cache.retrieve("kills-&uuid=a", || succeed(&calls, 9), || 0).await;
        assert_eq!(*a, 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_entries() {
        let (cache, _) = create_cache(CachePolicy::new(TTL, true));
        let calls = AtomicUsize::new(0);

        cache.retrieve("a", || succeed(&calls, 1), || 0).await;
        cache.retrieve("b", || fail(&calls), || 0).await;
        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.is_valid("a"));
    }
}

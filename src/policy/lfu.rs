//! # LFU Cache with LRU Tie-Breaking
//!
//! Bounded cache that evicts the key with the fewest recorded uses. When
//! several keys share the lowest count, the one that has gone longest
//! without a use at that count is evicted. Every operation is O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                            LfuCache<K, V>                                │
//!   │                                                                          │
//!   │   index: FxHashMap<K, CacheEntry<V>>                                     │
//!   │   ┌─────────┬─────────┬────────┬──────────┐                              │
//!   │   │   Key   │  value  │ bucket │ position │                              │
//!   │   ├─────────┼─────────┼────────┼──────────┤                              │
//!   │   │ page_1  │   ...   │   4    │  s0      │                              │
//!   │   │ page_2  │   ...   │   1    │  s3      │                              │
//!   │   │ page_3  │   ...   │   1    │  s1      │                              │
//!   │   └─────────┴─────────┴────────┴──────────┘                              │
//!   │                       │          │                                       │
//!   │                       ▼          ▼                                       │
//!   │   ledger: FrequencyLedger<K>                                             │
//!   │     head=1 ─► [s1, s3] ─► 4 ─► [s0]                                      │
//!   │               LRU  MRU                                                   │
//!   │                                                                          │
//!   │   capacity: usize                                                        │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `bucket` and `position` are plain handles into the ledger. A key keeps
//! its `position` for as long as it is resident; only `bucket` changes when
//! the key is used.
//!
//! ## Access Flow
//!
//! ```text
//!   get(k) / put(k, v) on a resident key
//!        │
//!        ▼
//!   next = ledger.next_bucket(entry.bucket)       creates bucket+1 if absent
//!   ledger.relocate(entry.position, old, next)    back of next = MRU
//!   ledger.drop_if_empty(old)
//!   entry.bucket = next
//!
//!   put(k, v) on a new key
//!        │
//!        ├─ capacity == 0 ──► dropped
//!        │
//!        ├─ len == capacity ──► evict front of least_frequency_bucket()
//!        │
//!        ▼
//!   ledger.push_back(bucket_for_new_key(), k)
//! ```
//!
//! ## Operations
//!
//! | Method          | Counts as a use | Complexity |
//! |-----------------|-----------------|------------|
//! | `get`           | on hit          | O(1)       |
//! | `put`/`insert`  | yes             | O(1)       |
//! | `peek`          | no              | O(1)       |
//! | `contains`      | no              | O(1)       |
//! | `remove`        | n/a             | O(1)       |
//! | `pop_lfu`       | n/a             | O(1)       |
//! | `peek_lfu`      | no              | O(1)       |
//! | `frequency`     | no              | O(1)       |
//!
//! ## Example
//!
//! ```
//! use lfukit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put(1, "one");
//! cache.put(2, "two");
//! cache.get(&1);
//!
//! // 2 has the lowest count and is evicted.
//! cache.put(3, "three");
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some(&"one"));
//! assert_eq!(cache.get(&3), Some(&"three"));
//! ```
//!
//! ## Thread Safety
//!
//! `LfuCache` is single-threaded. With the `concurrency` feature,
//! [`ConcurrentLfuCache`] wraps it in one `parking_lot::Mutex`.

use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

use log::{debug, trace};
#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{DEFAULT_BUCKET_PREALLOC, FrequencyLedger, PREALLOC_LIMIT, SlotId};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LfuMetricsReadRecorder, LfuMetricsRecorder, MetricsReset,
    MetricsSnapshotProvider,
};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, LfuCacheTrait, MutableCache};

/// Index entry for a resident key.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    /// Frequency of the bucket that owns the key.
    bucket: u64,
    position: SlotId,
}

/// LFU cache with LRU tie-breaking.
///
/// See the module documentation for the layout and eviction rules.
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    ledger: FrequencyLedger<K>,
    index: FxHashMap<K, CacheEntry<V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 is allowed; such a cache never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self::with_bucket_hint(capacity, DEFAULT_BUCKET_PREALLOC)
    }

    /// Creates a cache and pre-allocates room for `bucket_hint` distinct
    /// frequencies.
    ///
    /// Reservations are clamped to [`PREALLOC_LIMIT`], so any capacity is
    /// accepted without allocating for it up front.
    pub fn with_bucket_hint(capacity: usize, bucket_hint: usize) -> Self {
        debug!("lfu cache created: capacity={capacity} bucket_hint={bucket_hint}");
        Self {
            ledger: FrequencyLedger::with_capacity_and_bucket_hint(capacity, bucket_hint),
            index: FxHashMap::with_capacity_and_hasher(
                capacity.min(PREALLOC_LIMIT),
                Default::default(),
            ),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    /// Creates a cache from a signed capacity, rejecting negative values.
    ///
    /// ```
    /// use lfukit::policy::lfu::LfuCache;
    ///
    /// assert!(LfuCache::<u32, u32>::try_new(4).is_ok());
    /// assert!(LfuCache::<u32, u32>::try_new(-1).is_err());
    /// ```
    pub fn try_new(capacity: i64) -> Result<Self, ConfigError> {
        if capacity < 0 {
            return Err(ConfigError::negative_capacity(capacity));
        }
        let capacity = usize::try_from(capacity).unwrap_or(usize::MAX);
        Ok(Self::new(capacity))
    }

    /// Looks up `key` and records a use on a hit.
    ///
    /// A miss returns `None` and leaves the cache untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(entry) = self.index.get_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        Self::bump(&mut self.ledger, entry);

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        Some(&entry.value)
    }

    /// Stores `value` under `key`.
    ///
    /// A resident key has its value replaced and its count raised by one.
    /// A new key starts at count 1, evicting first if the cache is full.
    pub fn put(&mut self, key: K, value: V) {
        self.upsert(key, value);
    }

    /// Looks up `key` without recording a use.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|entry| &entry.value)
    }

    /// Lowest count among resident keys.
    pub fn min_frequency(&self) -> Option<u64> {
        self.ledger.least_frequency_bucket()
    }

    /// Number of distinct counts currently held.
    pub fn bucket_count(&self) -> usize {
        self.ledger.bucket_count()
    }

    /// Verifies the ledger and its agreement with the index.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.ledger.check_invariants()?;

        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.ledger.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but ledger holds {}",
                self.index.len(),
                self.ledger.len()
            )));
        }

        for (freq, _) in self.ledger.frequencies() {
            for (slot, key) in self.ledger.keys(freq) {
                let entry = self.index.get(key).ok_or_else(|| {
                    InvariantError::new(format!("bucket {freq} holds a key missing from the index"))
                })?;
                if entry.bucket != freq {
                    return Err(InvariantError::new(format!(
                        "entry records bucket {} but sits in bucket {freq}",
                        entry.bucket
                    )));
                }
                if entry.position != slot {
                    return Err(InvariantError::new(format!(
                        "entry records slot {} but sits in slot {}",
                        entry.position.index(),
                        slot.index()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Raises a resident key's count by one and makes it the most recently
    /// used key at its new count.
    fn bump(ledger: &mut FrequencyLedger<K>, entry: &mut CacheEntry<V>) {
        let from = entry.bucket;
        let Some(to) = ledger.next_bucket(from) else {
            return;
        };
        if ledger.relocate(entry.position, from, to) {
            ledger.drop_if_empty(from);
            entry.bucket = to;
        }
    }

    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(entry) = self.index.get_mut(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            Self::bump(&mut self.ledger, entry);
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.capacity == 0 {
            trace!("lfu cache has zero capacity, dropping new key");
            #[cfg(feature = "metrics")]
            self.metrics.record_zero_capacity_drop();
            return None;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.index.len() >= self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            if let Some((_key, _value)) = self.evict() {
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        let bucket = self.ledger.bucket_for_new_key();
        if let Some(position) = self.ledger.push_back(bucket, key.clone()) {
            self.index.insert(
                key,
                CacheEntry {
                    value,
                    bucket,
                    position,
                },
            );
        }
        None
    }

    /// Removes the front key of the lowest bucket.
    fn evict(&mut self) -> Option<(K, V)> {
        let freq = self.ledger.least_frequency_bucket()?;
        let slot = self.ledger.front(freq)?;
        let key = self.ledger.unlink(slot, freq)?;
        self.ledger.drop_if_empty(freq);
        let entry = self.index.remove(&key)?;
        trace!("lfu evicted key at frequency {freq}");
        Some((key, entry.value))
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("min_frequency", &self.min_frequency())
            .finish_non_exhaustive()
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.index.clear();
        self.ledger.clear();
    }
}

impl<K, V> MutableCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let entry = self.index.remove(key)?;
        self.ledger.unlink(entry.position, entry.bucket);
        self.ledger.drop_if_empty(entry.bucket);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        Some(entry.value)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lfu_call();

        let result = self.evict();

        #[cfg(feature = "metrics")]
        if result.is_some() {
            self.metrics.record_pop_lfu_found();
        }

        result
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_lfu_call();

        let freq = self.ledger.least_frequency_bucket()?;
        let key = self.ledger.key(self.ledger.front(freq)?)?;
        let entry = self.index.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_lfu_found();

        Some((key, &entry.value))
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        #[cfg(feature = "metrics")]
        self.metrics.record_frequency_call();

        let result = self.index.get(key).map(|entry| entry.bucket);

        #[cfg(feature = "metrics")]
        if result.is_some() {
            self.metrics.record_frequency_found();
        }

        result
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            zero_capacity_drops: self.metrics.zero_capacity_drops,
            clears: self.metrics.clears,
            pop_lfu_calls: self.metrics.pop_lfu_calls,
            pop_lfu_found: self.metrics.pop_lfu_found,
            peek_lfu_calls: self.metrics.peek_lfu_calls.get(),
            peek_lfu_found: self.metrics.peek_lfu_found.get(),
            frequency_calls: self.metrics.frequency_calls.get(),
            frequency_found: self.metrics.frequency_found.get(),
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            cache_len: self.index.len(),
            capacity: self.capacity,
            bucket_count: self.ledger.bucket_count(),
            min_frequency: self.ledger.least_frequency_bucket(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LfuMetricsSnapshot> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> LfuMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

/// Thread-safe LFU cache: one `parking_lot::Mutex` around an [`LfuCache`].
///
/// Every call takes the lock for its whole duration, so a relocation is never
/// observed half-done. Reads return clones because no reference may outlive
/// the guard; use [`get_with`](Self::get_with) to borrow instead.
///
/// ```
/// use lfukit::policy::lfu::ConcurrentLfuCache;
/// use std::thread;
///
/// let cache: ConcurrentLfuCache<u32, String> = ConcurrentLfuCache::new(64);
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let cache = cache.clone();
///         thread::spawn(move || {
///             for i in 0..8 {
///                 cache.put(t * 8 + i, format!("v{i}"));
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(cache.len(), 32);
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Arc<Mutex<LfuCache<K, V>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLfuCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(LfuCache::new(capacity))
    }

    pub fn try_new(capacity: i64) -> Result<Self, ConfigError> {
        LfuCache::try_new(capacity).map(Self::from_cache)
    }

    /// Wraps an existing cache, e.g. one produced by the builder.
    pub fn from_cache(cache: LfuCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Looks up `key`, records a use on a hit, and returns a clone.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Looks up `key`, records a use on a hit, and hands the value to `f`
    /// while the lock is held.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.lock().get(key).map(f)
    }

    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Like [`put`](Self::put), returning the replaced value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn pop_lfu(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lfu()
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Runs `f` with exclusive access to the inner cache.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LfuCache<K, V>) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

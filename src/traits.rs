//! # Cache Trait Hierarchy
//!
//! Generic interfaces for code that consumes a cache without caring how it is
//! built. [`LfuCache`](crate::policy::lfu::LfuCache) implements all three
//! traits; [`ConcurrentLfuCache`](crate::policy::lfu::ConcurrentLfuCache)
//! carries the [`ConcurrentCache`] marker.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len / is_empty / capacity / clear      │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          MutableCache<K, V>             │
//!   │  remove(&K) → Option<V>                 │
//!   │  remove_batch(&[K])                     │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          LfuCacheTrait<K, V>            │
//!   │  pop_lfu() → Option<(K, V)>             │
//!   │  peek_lfu() → Option<(&K, &V)>          │
//!   │  frequency(&K) → Option<u64>            │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! ## Access Semantics
//!
//! | Method      | Counts as a use? | Notes                                  |
//! |-------------|------------------|----------------------------------------|
//! | `insert`    | yes              | New keys start at 1, updates bump by 1 |
//! | `get`       | yes (on hit)     | Misses change nothing                  |
//! | `contains`  | no               |                                        |
//! | `peek_lfu`  | no               |                                        |
//! | `frequency` | no               |                                        |
//!
//! ## Thread Safety
//!
//! Implementations are single-threaded unless they carry [`ConcurrentCache`].
//! Share a plain cache behind one lock around each whole call.

/// Core cache operations.
///
/// # Example
///
/// ```
/// use lfukit::traits::CoreCache;
/// use lfukit::policy::lfu::LfuCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LfuCache::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity, an entry may be evicted before the new
    /// entry is inserted.
    ///
    /// ```
    /// use lfukit::traits::CoreCache;
    /// use lfukit::policy::lfu::LfuCache;
    ///
    /// let mut cache = LfuCache::new(10);
    /// assert_eq!(cache.insert(1, "first"), None);
    /// assert_eq!(cache.insert(1, "second"), Some("first"));
    /// ```
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, recording the access.
    ///
    /// Use [`contains`](Self::contains) to test membership without touching
    /// eviction order.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without recording an access.
    fn contains(&self, key: &K) -> bool;

    /// Current number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);
}

/// Caches that support removal of arbitrary keys.
///
/// ```
/// use lfukit::traits::{CoreCache, MutableCache};
/// use lfukit::policy::lfu::LfuCache;
///
/// fn invalidate_keys<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = LfuCache::new(10);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
/// invalidate_keys(&mut cache, &[1]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys; results line up with `keys`.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// LFU-specific operations.
///
/// # Example
///
/// ```
/// use lfukit::traits::{CoreCache, LfuCacheTrait};
/// use lfukit::policy::lfu::LfuCache;
///
/// let mut cache: LfuCache<u64, &str> = LfuCache::new(3);
/// cache.insert(1, "first");
/// cache.insert(2, "second");
/// cache.insert(3, "third");
///
/// cache.get(&1);
/// cache.get(&1);
/// cache.get(&1);
/// assert_eq!(cache.frequency(&1), Some(4));
/// assert_eq!(cache.frequency(&2), Some(1));
///
/// // 2 and 3 tie at frequency 1; 2 has gone untouched the longest.
/// assert_eq!(cache.pop_lfu(), Some((2, "second")));
/// ```
pub trait LfuCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the eviction victim: lowest frequency, least
    /// recently used among ties. `None` if the cache is empty.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    /// Returns the eviction victim without removing it or recording an access.
    fn peek_lfu(&self) -> Option<(&K, &V)>;

    /// Access count for `key`, or `None` if it is not resident.
    fn frequency(&self, key: &K) -> Option<u64>;
}

/// Marker for caches that are safe to share between threads.
///
/// ```
/// use lfukit::traits::ConcurrentCache;
///
/// fn assert_shareable<C: ConcurrentCache>(_: &C) {}
/// ```
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Unbounded map used to exercise default methods in isolation.
    #[derive(Default)]
    struct MapCache {
        data: HashMap<i32, String>,
    }

    impl CoreCache<i32, String> for MapCache {
        fn insert(&mut self, key: i32, value: String) -> Option<String> {
            self.data.insert(key, value)
        }

        fn get(&mut self, key: &i32) -> Option<&String> {
            self.data.get(key)
        }

        fn contains(&self, key: &i32) -> bool {
            self.data.contains_key(key)
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            usize::MAX
        }

        fn clear(&mut self) {
            self.data.clear();
        }
    }

    impl MutableCache<i32, String> for MapCache {
        fn remove(&mut self, key: &i32) -> Option<String> {
            self.data.remove(key)
        }
    }

    #[test]
    fn default_is_empty_follows_len() {
        let mut cache = MapCache::default();
        assert!(cache.is_empty());
        cache.insert(1, "one".to_string());
        assert!(!cache.is_empty());
    }

    #[test]
    fn default_remove_batch_preserves_order() {
        let mut cache = MapCache::default();
        cache.insert(1, "one".to_string());
        cache.insert(3, "three".to_string());

        let removed = cache.remove_batch(&[3, 2, 1]);
        assert_eq!(
            removed,
            vec![Some("three".to_string()), None, Some("one".to_string())]
        );
        assert!(cache.is_empty());
    }
}

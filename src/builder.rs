//! Validated construction for [`LfuCache`].
//!
//! The builder is the crate's configuration surface. Capacity is required;
//! the bucket hint only controls pre-allocation.
//!
//! ## Example
//!
//! ```rust
//! use lfukit::builder::LfuCacheBuilder;
//!
//! let mut cache = LfuCacheBuilder::new()
//!     .capacity(100)
//!     .bucket_hint(8)
//!     .try_build::<u64, String>()
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::ds::DEFAULT_BUCKET_PREALLOC;
use crate::error::ConfigError;
#[cfg(feature = "concurrency")]
use crate::policy::lfu::ConcurrentLfuCache;
use crate::policy::lfu::LfuCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capacity {
    Unset,
    Exact(usize),
    Signed(i64),
}

/// Builder for [`LfuCache`] and, with the `concurrency` feature,
/// [`ConcurrentLfuCache`].
#[derive(Debug, Clone)]
pub struct LfuCacheBuilder {
    capacity: Capacity,
    bucket_hint: usize,
}

impl Default for LfuCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LfuCacheBuilder {
    pub fn new() -> Self {
        Self {
            capacity: Capacity::Unset,
            bucket_hint: DEFAULT_BUCKET_PREALLOC,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Capacity::Exact(capacity);
        self
    }

    /// Maximum number of entries, taken from a signed source such as a
    /// config value. Negative values fail at build time.
    pub fn signed_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Capacity::Signed(capacity);
        self
    }

    /// Number of distinct frequencies to pre-allocate bucket space for.
    pub fn bucket_hint(mut self, bucket_hint: usize) -> Self {
        self.bucket_hint = bucket_hint;
        self
    }

    fn resolve_capacity(&self) -> Result<usize, ConfigError> {
        match self.capacity {
            Capacity::Unset => Err(ConfigError::new("capacity is required")),
            Capacity::Exact(capacity) => Ok(capacity),
            Capacity::Signed(capacity) if capacity < 0 => {
                Err(ConfigError::negative_capacity(capacity))
            },
            Capacity::Signed(capacity) => Ok(usize::try_from(capacity).unwrap_or(usize::MAX)),
        }
    }

    /// Builds the cache, returning an error on invalid parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if no capacity was set or the capacity is
    /// negative.
    pub fn try_build<K, V>(self) -> Result<LfuCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let capacity = self.resolve_capacity()?;
        Ok(LfuCache::with_bucket_hint(capacity, self.bucket_hint))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. For a non-panicking
    /// alternative, use [`try_build`](Self::try_build).
    pub fn build<K, V>(self) -> LfuCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a shared cache behind one lock.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<K, V>(self) -> Result<ConcurrentLfuCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send,
        V: Send,
    {
        self.try_build().map(ConcurrentLfuCache::from_cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CoreCache;

    #[test]
    fn builds_with_capacity() {
        let cache = LfuCacheBuilder::new()
            .capacity(10)
            .try_build::<u64, String>()
            .unwrap();
        assert_eq!(cache.capacity(), 10);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_capacity_is_rejected() {
        let err = LfuCacheBuilder::new()
            .bucket_hint(4)
            .try_build::<u64, u64>()
            .unwrap_err();
        assert_eq!(err.message(), "capacity is required");
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let err = LfuCacheBuilder::new()
            .signed_capacity(-1)
            .try_build::<u64, u64>()
            .unwrap_err();
        assert!(err.message().contains("non-negative"));
    }

    #[test]
    fn signed_capacity_accepts_zero_and_positive() {
        let zero = LfuCacheBuilder::new().signed_capacity(0).build::<u64, u64>();
        assert_eq!(zero.capacity(), 0);

        let mut cache = LfuCacheBuilder::new().signed_capacity(2).build::<u64, u64>();
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn huge_signed_capacity_builds() {
        let mut cache = LfuCacheBuilder::new()
            .signed_capacity(i64::MAX)
            .bucket_hint(usize::MAX)
            .try_build::<u64, u64>()
            .unwrap();
        cache.put(7, 70);
        assert_eq!(cache.get(&7), Some(&70));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn last_capacity_call_wins() {
        let cache = LfuCacheBuilder::new()
            .signed_capacity(-4)
            .capacity(3)
            .build::<u8, u8>();
        assert_eq!(cache.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-negative")]
    fn build_panics_on_invalid_config() {
        let _ = LfuCacheBuilder::new().signed_capacity(-2).build::<u8, u8>();
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn builds_concurrent_cache() {
        let cache = LfuCacheBuilder::new()
            .capacity(4)
            .try_build_concurrent::<u32, u32>()
            .unwrap();
        cache.put(1, 10);
        assert_eq!(cache.get(&1), Some(10));
    }
}

//! lfukit: a constant-time LFU cache with LRU tie-breaking.
//!
//! [`LfuCache`](policy::lfu::LfuCache) evicts the key with the fewest uses,
//! and among equally used keys the one untouched the longest. Keys live in a
//! [`FrequencyLedger`](ds::FrequencyLedger) of per-count buckets, so lookups,
//! bumps and evictions never scan.
//!
//! ```
//! use lfukit::prelude::*;
//!
//! let mut cache = LfuCache::new(3);
//! cache.put(1, 2);
//! cache.put(2, 3);
//! cache.put(3, 4);
//! cache.put(4, 5);
//!
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.get(&2), Some(&3));
//! ```
//!
//! Features:
//! - `metrics`: operation counters and [`LfuMetricsSnapshot`](metrics::snapshot::LfuMetricsSnapshot).
//! - `concurrency`: [`ConcurrentLfuCache`](policy::lfu::ConcurrentLfuCache), a
//!   single-lock shared wrapper.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

//! Operation counters for [`LfuCache`](crate::policy::lfu::LfuCache).
//!
//! Enabled by the `metrics` feature. Recording is split from reading:
//! the cache writes through [`traits::CoreMetricsRecorder`] and
//! [`traits::LfuMetricsRecorder`], and callers read an
//! [`snapshot::LfuMetricsSnapshot`] through
//! [`traits::MetricsSnapshotProvider`].
//!
//! ```
//! use lfukit::metrics::traits::MetricsSnapshotProvider;
//! use lfukit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(1);
//! cache.put(1, "a");
//! cache.get(&1);
//! cache.get(&2);
//! cache.put(3, "c");
//!
//! let snap = cache.snapshot();
//! assert_eq!(snap.get_hits, 1);
//! assert_eq!(snap.get_misses, 1);
//! assert_eq!(snap.evicted_entries, 1);
//! ```

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

//! # Metrics Traits
//!
//! Recording, snapshotting, and resetting are separate traits so the cache
//! only depends on what it writes.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │   get hit/miss, insert, evict, clear
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐   ┌─────────────────────────────┐
//!   │     LfuMetricsRecorder      │   │   LfuMetricsReadRecorder    │
//!   │  pop_lfu, remove, drops     │   │  peek_lfu, frequency (&self)│
//!   └─────────────────────────────┘   └─────────────────────────────┘
//!
//!   Consumption:
//!   ┌─────────────────────────────┐   ┌─────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>  │   │ MetricsReset                │
//!   └─────────────────────────────┘   └─────────────────────────────┘
//! ```

/// Counters shared by any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// LFU counters recorded from `&mut self` operations.
pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lfu_call(&mut self);
    fn record_pop_lfu_found(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    /// A new key was dropped because the cache has capacity 0.
    fn record_zero_capacity_drop(&mut self);
}

/// LFU counters recorded from `&self` operations.
pub trait LfuMetricsReadRecorder {
    fn record_peek_lfu_call(&self);
    fn record_peek_lfu_found(&self);
    fn record_frequency_call(&self);
    fn record_frequency_found(&self);
}

/// Point-in-time copy of a cache's counters and gauges.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Zeroes counters between test phases or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{CoreMetricsRecorder, LfuMetricsReadRecorder, LfuMetricsRecorder};

#[derive(Debug, Default)]
pub struct LfuMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub zero_capacity_drops: u64,
    pub clears: u64,
    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub peek_lfu_calls: MetricsCell,
    pub peek_lfu_found: MetricsCell,
    pub frequency_calls: MetricsCell,
    pub frequency_found: MetricsCell,
}

impl LfuMetrics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for LfuMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl LfuMetricsRecorder for LfuMetrics {
    fn record_pop_lfu_call(&mut self) {
        self.pop_lfu_calls += 1;
    }

    fn record_pop_lfu_found(&mut self) {
        self.pop_lfu_found += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_zero_capacity_drop(&mut self) {
        self.zero_capacity_drops += 1;
    }
}

impl LfuMetricsReadRecorder for LfuMetrics {
    fn record_peek_lfu_call(&self) {
        self.peek_lfu_calls.incr();
    }

    fn record_peek_lfu_found(&self) {
        self.peek_lfu_found.incr();
    }

    fn record_frequency_call(&self) {
        self.frequency_calls.incr();
    }

    fn record_frequency_found(&self) {
        self.frequency_found.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_counters_split_hits_and_misses() {
        let mut metrics = LfuMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_hit();
        metrics.record_get_miss();
        assert_eq!(metrics.get_calls, 3);
        assert_eq!(metrics.get_hits, 2);
        assert_eq!(metrics.get_misses, 1);
    }

    #[test]
    fn read_recorder_works_through_shared_ref() {
        let metrics = LfuMetrics::default();
        metrics.record_peek_lfu_call();
        metrics.record_frequency_call();
        metrics.record_frequency_found();
        assert_eq!(metrics.peek_lfu_calls.get(), 1);
        assert_eq!(metrics.frequency_calls.get(), 1);
        assert_eq!(metrics.frequency_found.get(), 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut metrics = LfuMetrics::default();
        metrics.record_insert_call();
        metrics.record_evicted_entry();
        metrics.record_peek_lfu_found();
        metrics.reset();
        assert_eq!(metrics.insert_calls, 0);
        assert_eq!(metrics.evicted_entries, 0);
        assert_eq!(metrics.peek_lfu_found.get(), 0);
    }
}

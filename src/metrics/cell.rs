use std::cell::Cell;

/// Counter that can be bumped through `&self`.
///
/// Used for reads such as `peek_lfu` and `frequency` that take `&self`.
/// The cell is `Send` but not `Sync`; shared caches serialize access with a
/// lock, which is all these counters need.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get().saturating_add(1));
    }
}

//! Frequency ledger: ordered, non-empty frequency buckets with O(1) navigation.
//!
//! The ledger keeps every resident key in exactly one bucket. A bucket holds
//! the keys that currently share one access count, ordered from least recently
//! used (front) to most recently used (back). Buckets are kept in ascending
//! frequency order with no gaps filled in and no empty buckets left behind.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        FrequencyLedger<K> Layout                            │
//! │                                                                             │
//! │   head = 1                                                                  │
//! │     │                                                                       │
//! │     ▼                                                                       │
//! │   buckets: FxHashMap<u64, Bucket>                                           │
//! │                                                                             │
//! │   freq=1 ──higher──► freq=2 ──higher──► freq=5                              │
//! │          ◄──lower───        ◄──lower───                                     │
//! │     │                  │                   │                                │
//! │     ▼                  ▼                   ▼                                │
//! │   front ─► [s3] ◄─► [s7] ◄─ back                                            │
//! │            LRU       MRU                                                    │
//! │                                                                             │
//! │   slots: SlotArena<KeySlot<K>>   (key + prev/next SlotId links)             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every navigation step is relative to a bucket the caller already holds:
//! [`next_bucket`](FrequencyLedger::next_bucket) looks only at `current` and
//! its `higher` neighbour, and [`drop_if_empty`](FrequencyLedger::drop_if_empty)
//! splices a bucket out through its own links. No operation walks the ledger.
//!
//! ## Operations
//!
//! | Operation                | Time | Notes                                   |
//! |--------------------------|------|-----------------------------------------|
//! | `bucket_for_new_key`     | O(1) | Creates freq=1 at the head if absent     |
//! | `next_bucket`            | O(1) | Creates `current + 1` right after it     |
//! | `drop_if_empty`          | O(1) | Unlinks an empty bucket                 |
//! | `least_frequency_bucket` | O(1) | Head of the ledger                      |
//! | `push_back`              | O(1) | Appends a key as MRU of a bucket        |
//! | `relocate`               | O(1) | Moves a slot to the back of a bucket    |
//! | `unlink`                 | O(1) | Removes a slot, returns its key         |
//!
//! ## Example
//!
//! ```
//! use lfukit::ds::FrequencyLedger;
//!
//! let mut ledger = FrequencyLedger::new();
//! let one = ledger.bucket_for_new_key();
//! let a = ledger.push_back(one, "a").unwrap();
//! let _b = ledger.push_back(one, "b").unwrap();
//!
//! // Bump "a" to frequency 2.
//! let two = ledger.next_bucket(one).unwrap();
//! ledger.relocate(a, one, two);
//! ledger.drop_if_empty(one);
//!
//! assert_eq!(ledger.least_frequency_bucket(), Some(1));
//! let order: Vec<_> = ledger.frequencies().collect();
//! assert_eq!(order, vec![(1, 1), (2, 1)]);
//! ```

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

/// Default bucket pre-allocation.
/// Most keys sit at low frequencies, so 32 distinct counts covers the common case.
pub const DEFAULT_BUCKET_PREALLOC: usize = 32;

/// Upper bound on up-front reservations. Larger capacities grow on demand.
pub const PREALLOC_LIMIT: usize = 1 << 16;

#[derive(Debug)]
struct KeySlot<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    key: K,
}

#[derive(Debug, Default)]
struct Bucket {
    front: Option<SlotId>,
    back: Option<SlotId>,
    len: usize,
    lower: Option<u64>,
    higher: Option<u64>,
}

/// Ascending sequence of non-empty frequency buckets.
///
/// Buckets are addressed by their frequency; key positions are addressed by
/// [`SlotId`]. Both handles stay valid until the bucket is dropped or the slot
/// is unlinked, so callers may store them next to their own data.
#[derive(Debug)]
pub struct FrequencyLedger<K> {
    slots: SlotArena<KeySlot<K>>,
    buckets: FxHashMap<u64, Bucket>,
    head: Option<u64>,
}

impl<K> FrequencyLedger<K> {
    pub fn new() -> Self {
        Self {
            slots: SlotArena::new(),
            buckets: FxHashMap::default(),
            head: None,
        }
    }

    /// Reserves room for `capacity` keys and [`DEFAULT_BUCKET_PREALLOC`] buckets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_bucket_hint(capacity, DEFAULT_BUCKET_PREALLOC)
    }

    /// Reserves room for `capacity` keys and `bucket_hint` distinct frequencies,
    /// each clamped to [`PREALLOC_LIMIT`].
    pub fn with_capacity_and_bucket_hint(capacity: usize, bucket_hint: usize) -> Self {
        Self {
            slots: SlotArena::with_capacity(capacity.min(PREALLOC_LIMIT)),
            buckets: FxHashMap::with_capacity_and_hasher(
                bucket_hint.min(PREALLOC_LIMIT),
                Default::default(),
            ),
            head: None,
        }
    }

    /// Number of keys across all buckets.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live (non-empty) buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the lowest frequency present, or `None` when the ledger is empty.
    ///
    /// The front key of this bucket is the global eviction candidate.
    #[inline]
    pub fn least_frequency_bucket(&self) -> Option<u64> {
        self.head
    }

    /// Number of keys in the bucket for `freq` (0 if there is none).
    pub fn bucket_len(&self, freq: u64) -> usize {
        self.buckets.get(&freq).map_or(0, |bucket| bucket.len)
    }

    /// Least recently used slot of the bucket for `freq`.
    #[inline]
    pub fn front(&self, freq: u64) -> Option<SlotId> {
        self.buckets.get(&freq)?.front
    }

    /// Key stored in `slot`.
    #[inline]
    pub fn key(&self, slot: SlotId) -> Option<&K> {
        self.slots.get(slot).map(|slot| &slot.key)
    }

    /// Iterates the keys of one bucket from least to most recently used.
    pub fn keys(&self, freq: u64) -> BucketKeys<'_, K> {
        BucketKeys {
            ledger: self,
            current: self.front(freq),
        }
    }

    /// Iterates `(frequency, bucket_len)` in ascending frequency order.
    pub fn frequencies(&self) -> Frequencies<'_, K> {
        Frequencies {
            ledger: self,
            current: self.head,
        }
    }

    /// Returns the bucket with frequency 1, creating it at the head if absent.
    pub fn bucket_for_new_key(&mut self) -> u64 {
        if self.head == Some(1) {
            return 1;
        }

        let higher = self.head;
        self.buckets.insert(
            1,
            Bucket {
                higher,
                ..Bucket::default()
            },
        );
        if let Some(higher) = higher
            && let Some(bucket) = self.buckets.get_mut(&higher)
        {
            bucket.lower = Some(1);
        }
        self.head = Some(1);
        1
    }

    /// Returns the bucket one frequency above `current`, creating it right
    /// after `current` if absent.
    ///
    /// Frequencies saturate: at `u64::MAX` this returns `current` itself.
    /// Returns `None` if `current` is not a live bucket.
    pub fn next_bucket(&mut self, current: u64) -> Option<u64> {
        let higher = self.buckets.get(&current)?.higher;
        let Some(target) = current.checked_add(1) else {
            return Some(current);
        };
        if higher == Some(target) {
            return Some(target);
        }

        self.buckets.insert(
            target,
            Bucket {
                lower: Some(current),
                higher,
                ..Bucket::default()
            },
        );
        if let Some(bucket) = self.buckets.get_mut(&current) {
            bucket.higher = Some(target);
        }
        if let Some(higher) = higher
            && let Some(bucket) = self.buckets.get_mut(&higher)
        {
            bucket.lower = Some(target);
        }
        Some(target)
    }

    /// Removes the bucket for `freq` if it holds no keys. Returns `true` if a
    /// bucket was removed.
    pub fn drop_if_empty(&mut self, freq: u64) -> bool {
        if !self.buckets.get(&freq).is_some_and(|bucket| bucket.len == 0) {
            return false;
        }
        let Some(bucket) = self.buckets.remove(&freq) else {
            return false;
        };

        if let Some(lower) = bucket.lower
            && let Some(neighbour) = self.buckets.get_mut(&lower)
        {
            neighbour.higher = bucket.higher;
        }
        if let Some(higher) = bucket.higher
            && let Some(neighbour) = self.buckets.get_mut(&higher)
        {
            neighbour.lower = bucket.lower;
        }
        if self.head == Some(freq) {
            self.head = bucket.higher;
        }
        true
    }

    /// Appends `key` as the most recently used entry of the bucket for `freq`.
    ///
    /// Returns `None` (and drops nothing into the arena) if the bucket does
    /// not exist.
    pub fn push_back(&mut self, freq: u64, key: K) -> Option<SlotId> {
        if !self.buckets.contains_key(&freq) {
            return None;
        }
        let id = self.slots.insert(KeySlot {
            prev: None,
            next: None,
            key,
        });
        self.link_back(freq, id);
        Some(id)
    }

    /// Moves `slot` from the bucket for `from` to the back of the bucket for
    /// `to`. The slot keeps its [`SlotId`].
    ///
    /// The `from` bucket is left in place even if it becomes empty; follow up
    /// with [`drop_if_empty`](Self::drop_if_empty).
    pub fn relocate(&mut self, slot: SlotId, from: u64, to: u64) -> bool {
        if !self.buckets.contains_key(&to) {
            return false;
        }
        if !self.unlink_from(from, slot) {
            return false;
        }
        self.link_back(to, slot);
        true
    }

    /// Removes `slot` from the bucket for `freq` and returns its key.
    ///
    /// Like [`relocate`](Self::relocate), this never drops the bucket.
    pub fn unlink(&mut self, slot: SlotId, freq: u64) -> Option<K> {
        if !self.unlink_from(freq, slot) {
            return None;
        }
        self.slots.remove(slot).map(|slot| slot.key)
    }

    /// Drops every bucket and key.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.buckets.clear();
        self.head = None;
    }

    /// Walks the ledger from the head and verifies its structure.
    ///
    /// Checks ascending order, back links, non-empty buckets, per-bucket list
    /// links and lengths, and that no bucket or slot is unreachable.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut expected_lower: Option<u64> = None;
        let mut cursor = self.head;
        let mut seen_buckets = 0usize;
        let mut seen_slots = 0usize;

        while let Some(freq) = cursor {
            let bucket = self.buckets.get(&freq).ok_or_else(|| {
                InvariantError::new(format!("bucket {freq} is linked but missing"))
            })?;
            if freq == 0 {
                return Err(InvariantError::new("bucket with frequency 0"));
            }
            if let Some(lower) = expected_lower
                && lower >= freq
            {
                return Err(InvariantError::new(format!(
                    "bucket {freq} follows bucket {lower}"
                )));
            }
            if bucket.lower != expected_lower {
                return Err(InvariantError::new(format!(
                    "bucket {freq} has lower link {:?}, expected {:?}",
                    bucket.lower, expected_lower
                )));
            }
            if bucket.len == 0 {
                return Err(InvariantError::new(format!("bucket {freq} is empty")));
            }

            let mut prev = None;
            let mut slot_cursor = bucket.front;
            let mut count = 0usize;
            while let Some(id) = slot_cursor {
                let slot = self.slots.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {freq} links vacant slot {}", id.index()))
                })?;
                if slot.prev != prev {
                    return Err(InvariantError::new(format!(
                        "slot {} in bucket {freq} has a broken prev link",
                        id.index()
                    )));
                }
                count += 1;
                if count > bucket.len {
                    return Err(InvariantError::new(format!(
                        "bucket {freq} list is longer than its recorded length"
                    )));
                }
                prev = Some(id);
                slot_cursor = slot.next;
            }
            if bucket.back != prev || count != bucket.len {
                return Err(InvariantError::new(format!(
                    "bucket {freq} records len {} but links {count}",
                    bucket.len
                )));
            }

            seen_buckets += 1;
            seen_slots += count;
            expected_lower = Some(freq);
            cursor = bucket.higher;
        }

        if seen_buckets != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "{} buckets stored but {seen_buckets} reachable from head",
                self.buckets.len()
            )));
        }
        if seen_slots != self.slots.len() {
            return Err(InvariantError::new(format!(
                "{} slots stored but {seen_slots} linked into buckets",
                self.slots.len()
            )));
        }
        Ok(())
    }

    fn link_back(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };
        let old_back = bucket.back;
        bucket.back = Some(id);
        if old_back.is_none() {
            bucket.front = Some(id);
        }
        bucket.len += 1;

        if let Some(slot) = self.slots.get_mut(id) {
            slot.prev = old_back;
            slot.next = None;
        }
        if let Some(old_back) = old_back
            && let Some(slot) = self.slots.get_mut(old_back)
        {
            slot.next = Some(id);
        }
    }

    fn unlink_from(&mut self, freq: u64, id: SlotId) -> bool {
        let Some((prev, next)) = self.slots.get(id).map(|slot| (slot.prev, slot.next)) else {
            return false;
        };
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return false;
        };

        match prev {
            Some(prev) => {
                if let Some(slot) = self.slots.get_mut(prev) {
                    slot.next = next;
                }
            },
            None => bucket.front = next,
        }
        match next {
            Some(next) => {
                if let Some(slot) = self.slots.get_mut(next) {
                    slot.prev = prev;
                }
            },
            None => bucket.back = prev,
        }
        bucket.len = bucket.len.saturating_sub(1);

        if let Some(slot) = self.slots.get_mut(id) {
            slot.prev = None;
            slot.next = None;
        }
        true
    }
}

impl<K> Default for FrequencyLedger<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(SlotId, &K)` of one bucket, front (LRU) to back (MRU).
#[derive(Debug)]
pub struct BucketKeys<'a, K> {
    ledger: &'a FrequencyLedger<K>,
    current: Option<SlotId>,
}

impl<'a, K> Iterator for BucketKeys<'a, K> {
    type Item = (SlotId, &'a K);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let slot = self.ledger.slots.get(id)?;
        self.current = slot.next;
        Some((id, &slot.key))
    }
}

/// Iterator over `(frequency, bucket_len)` in ascending order.
#[derive(Debug)]
pub struct Frequencies<'a, K> {
    ledger: &'a FrequencyLedger<K>,
    current: Option<u64>,
}

impl<K> Iterator for Frequencies<'_, K> {
    type Item = (u64, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let freq = self.current?;
        let bucket = self.ledger.buckets.get(&freq)?;
        self.current = bucket.higher;
        Some((freq, bucket.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of<K: Clone>(ledger: &FrequencyLedger<K>, freq: u64) -> Vec<K> {
        ledger.keys(freq).map(|(_, key)| key.clone()).collect()
    }

    /// Moves `slot` one frequency up the way the cache does.
    fn bump<K>(ledger: &mut FrequencyLedger<K>, slot: SlotId, freq: u64) -> u64 {
        let next = ledger.next_bucket(freq).unwrap();
        assert!(ledger.relocate(slot, freq, next));
        ledger.drop_if_empty(freq);
        next
    }

    #[test]
    fn empty_ledger() {
        let ledger: FrequencyLedger<u32> = FrequencyLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.least_frequency_bucket(), None);
        assert_eq!(ledger.front(1), None);
        assert_eq!(ledger.frequencies().count(), 0);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn bucket_for_new_key_is_idempotent() {
        let mut ledger = FrequencyLedger::new();
        assert_eq!(ledger.bucket_for_new_key(), 1);
        ledger.push_back(1, "a").unwrap();
        assert_eq!(ledger.bucket_for_new_key(), 1);
        assert_eq!(ledger.bucket_count(), 1);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn keys_are_ordered_lru_to_mru() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        for key in ["a", "b", "c"] {
            ledger.push_back(one, key).unwrap();
        }
        assert_eq!(keys_of(&ledger, 1), vec!["a", "b", "c"]);
        assert_eq!(ledger.key(ledger.front(1).unwrap()), Some(&"a"));
    }

    #[test]
    fn next_bucket_reuses_adjacent_bucket() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        let a = ledger.push_back(one, "a").unwrap();
        let b = ledger.push_back(one, "b").unwrap();

        let two = bump(&mut ledger, a, 1);
        assert_eq!(two, 2);
        assert_eq!(ledger.next_bucket(1), Some(2));
        bump(&mut ledger, b, 1);

        assert_eq!(ledger.bucket_count(), 1);
        assert_eq!(ledger.least_frequency_bucket(), Some(2));
        assert_eq!(keys_of(&ledger, 2), vec!["a", "b"]);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn next_bucket_inserts_between_gaps() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        let a = ledger.push_back(one, "a").unwrap();
        let b = ledger.push_back(one, "b").unwrap();

        // a: 1 -> 2 -> 3 -> 4, then b: 1 -> 2 lands between 1 and 4 once 1 empties.
        let mut freq = 1;
        for _ in 0..3 {
            freq = bump(&mut ledger, a, freq);
        }
        assert_eq!(freq, 4);
        let b_freq = bump(&mut ledger, b, 1);
        assert_eq!(b_freq, 2);

        let order: Vec<_> = ledger.frequencies().collect();
        assert_eq!(order, vec![(2, 1), (4, 1)]);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn oversized_reservation_is_clamped() {
        let mut ledger = FrequencyLedger::with_capacity_and_bucket_hint(usize::MAX, usize::MAX);
        let one = ledger.bucket_for_new_key();
        assert!(ledger.push_back(one, 'a').is_some());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn new_key_bucket_goes_in_front_of_higher_buckets() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        let a = ledger.push_back(one, "a").unwrap();
        bump(&mut ledger, a, 1);
        assert_eq!(ledger.least_frequency_bucket(), Some(2));

        let one = ledger.bucket_for_new_key();
        ledger.push_back(one, "b").unwrap();
        let order: Vec<_> = ledger.frequencies().collect();
        assert_eq!(order, vec![(1, 1), (2, 1)]);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn drop_if_empty_ignores_populated_and_missing_buckets() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        ledger.push_back(one, 10u32).unwrap();
        assert!(!ledger.drop_if_empty(1));
        assert!(!ledger.drop_if_empty(7));
        assert_eq!(ledger.bucket_count(), 1);
    }

    #[test]
    fn unlink_then_drop_moves_head() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        let a = ledger.push_back(one, "a").unwrap();
        let b = ledger.push_back(one, "b").unwrap();
        bump(&mut ledger, b, 1);

        assert_eq!(ledger.unlink(a, 1), Some("a"));
        assert!(ledger.drop_if_empty(1));
        assert_eq!(ledger.least_frequency_bucket(), Some(2));
        assert_eq!(ledger.len(), 1);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn unlink_middle_keeps_neighbours_linked() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        ledger.push_back(one, 1u8).unwrap();
        let mid = ledger.push_back(one, 2u8).unwrap();
        ledger.push_back(one, 3u8).unwrap();

        assert_eq!(ledger.unlink(mid, 1), Some(2));
        assert_eq!(keys_of(&ledger, 1), vec![1, 3]);
        assert_eq!(ledger.bucket_len(1), 2);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn push_back_into_missing_bucket_is_rejected() {
        let mut ledger = FrequencyLedger::new();
        assert_eq!(ledger.push_back(3, "x"), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn saturated_frequency_stays_in_place() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.bucket_for_new_key();
        let a = ledger.push_back(one, "a").unwrap();
        let b = ledger.push_back(one, "b").unwrap();
        // Link a bucket at u64::MAX directly above 1.
        ledger.buckets.insert(
            u64::MAX,
            Bucket {
                lower: Some(1),
                ..Bucket::default()
            },
        );
        ledger.buckets.get_mut(&1).unwrap().higher = Some(u64::MAX);
        assert!(ledger.relocate(a, 1, u64::MAX));
        assert!(ledger.relocate(b, 1, u64::MAX));
        assert!(ledger.drop_if_empty(1));
        assert_eq!(ledger.least_frequency_bucket(), Some(u64::MAX));

        assert_eq!(ledger.next_bucket(u64::MAX), Some(u64::MAX));
        assert!(ledger.relocate(a, u64::MAX, u64::MAX));
        assert_eq!(keys_of(&ledger, u64::MAX), vec!["b", "a"]);
        ledger.check_invariants().unwrap();
    }

    #[test]
    fn check_invariants_reports_empty_bucket() {
        let mut ledger: FrequencyLedger<u32> = FrequencyLedger::new();
        ledger.bucket_for_new_key();
        let err = ledger.check_invariants().unwrap_err();
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn clear_resets_state() {
        let mut ledger = FrequencyLedger::with_capacity(8);
        let one = ledger.bucket_for_new_key();
        ledger.push_back(one, "a").unwrap();
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.bucket_count(), 0);
        assert_eq!(ledger.least_frequency_bucket(), None);
        ledger.check_invariants().unwrap();
    }
}

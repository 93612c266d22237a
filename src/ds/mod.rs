pub mod frequency_ledger;
pub mod slot_arena;

pub use frequency_ledger::{
    BucketKeys, DEFAULT_BUCKET_PREALLOC, Frequencies, FrequencyLedger, PREALLOC_LIMIT,
};
pub use slot_arena::{SlotArena, SlotId};

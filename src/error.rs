//! Error types for lfukit.
//!
//! Cache misses are not errors; they surface as `None`. The two error types
//! here cover construction and self-checks:
//!
//! - [`ConfigError`]: a cache was configured with an invalid parameter
//!   (a negative capacity).
//! - [`InvariantError`]: a `check_invariants` call found the ledger or the
//!   key index in an inconsistent state.
//!
//! ```
//! use lfukit::error::ConfigError;
//! use lfukit::policy::lfu::LfuCache;
//!
//! let cache: Result<LfuCache<u64, u64>, ConfigError> = LfuCache::try_new(16);
//! assert!(cache.is_ok());
//!
//! let err = LfuCache::<u64, u64>::try_new(-1).unwrap_err();
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an internal invariant does not hold.
///
/// Produced by [`FrequencyLedger::check_invariants`](crate::ds::FrequencyLedger::check_invariants)
/// and [`LfuCache::check_invariants`](crate::policy::lfu::LfuCache::check_invariants).
/// Seeing one outside of a test means the cache has a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`LfuCache::try_new`](crate::policy::lfu::LfuCache::try_new)
/// and [`LfuCacheBuilder::try_build`](crate::builder::LfuCacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use lfukit::builder::LfuCacheBuilder;
///
/// let err = LfuCacheBuilder::new().signed_capacity(-5).try_build::<u64, u64>().unwrap_err();
/// assert_eq!(err.message(), "capacity must be non-negative, got -5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The error for a capacity below zero.
    pub(crate) fn negative_capacity(capacity: i64) -> Self {
        Self(format!("capacity must be non-negative, got {capacity}"))
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use crate::cache::CacheValue;

// == Cache Entry ==
/// A stored value paired with its absolute expiration time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: CacheValue,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` after `now_ms`.
    pub fn new(value: CacheValue, ttl_seconds: u64, now_ms: u64) -> Self {
        Self {
            value,
            expires_at: expiry_from(now_ms, ttl_seconds),
        }
    }

    // == Refresh ==
    /// Overwrites the value in place and restarts the TTL from `now_ms`.
    pub fn refresh(&mut self, value: CacheValue, ttl_seconds: u64, now_ms: u64) {
        self.value = value;
        self.expires_at = expiry_from(now_ms, ttl_seconds);
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: the entry is expired once `now_ms` reaches
    /// `expires_at`, so it is live only while `expires_at > now_ms`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, saturating at zero.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

fn expiry_from(now_ms: u64, ttl_seconds: u64) -> u64 {
    now_ms.saturating_add(ttl_seconds.saturating_mul(1000))
}

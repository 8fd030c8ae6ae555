//! Cache Store Module
//!
//! Single-threaded cache engine: HashMap storage with lazy TTL expiration.
//! Every operation receives the current time explicitly; locking and the
//! clock live in [`Cache`](crate::cache::Cache).

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, CacheValue, ValueKind};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Key-value storage where expired entries are evicted only on access.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL in seconds for entries created by `update_property` / `add_to_array`
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL in seconds for implicitly created entries
    pub fn new(default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Add ==
    /// Stores a value, overwriting any prior entry for the key even if it
    /// has not expired yet.
    pub fn add(&mut self, key: String, value: CacheValue, ttl_seconds: u64, now_ms: u64) {
        self.entries
            .insert(key, CacheEntry::new(value, ttl_seconds, now_ms));
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str, now_ms: u64) -> Option<CacheValue> {
        if self.evict_if_expired(key, now_ms) {
            self.stats.record_miss();
            return None;
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Replace ==
    /// Refreshes an existing entry in place (expired or not), otherwise adds.
    ///
    /// Both branches leave the same state as `add`.
    pub fn replace(&mut self, key: &str, value: CacheValue, ttl_seconds: u64, now_ms: u64) {
        match self.entries.get_mut(key) {
            Some(entry) => entry.refresh(value, ttl_seconds, now_ms),
            None => self.add(key.to_string(), value, ttl_seconds, now_ms),
        }
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was stored under the key.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Update Property ==
    /// Sets one property of a record value without touching its expiry.
    ///
    /// A missing key gets a fresh single-property record with the default TTL.
    /// Fails with `TypeMismatch` if the live value is not a record.
    pub fn update_property(
        &mut self,
        key: &str,
        property: String,
        value: CacheValue,
        now_ms: u64,
    ) -> Result<()> {
        self.evict_if_expired(key, now_ms);

        match self.entries.get_mut(key) {
            Some(entry) => match &mut entry.value {
                CacheValue::Record(map) => {
                    map.insert(property, value);
                    Ok(())
                }
                other => Err(type_mismatch(key, ValueKind::Record, other.kind())),
            },
            None => {
                let record = CacheValue::record_with(property, value);
                self.add(key.to_string(), record, self.default_ttl, now_ms);
                Ok(())
            }
        }
    }

    // == Add To Array ==
    /// Appends to a list value without touching its expiry.
    ///
    /// With `unique`, the append is skipped when an equal element is already
    /// present. A missing key gets a single-element list with the default TTL.
    pub fn add_to_array(
        &mut self,
        key: &str,
        value: CacheValue,
        unique: bool,
        now_ms: u64,
    ) -> Result<()> {
        self.evict_if_expired(key, now_ms);

        match self.entries.get_mut(key) {
            Some(entry) => match &mut entry.value {
                CacheValue::List(items) => {
                    if !(unique && items.contains(&value)) {
                        items.push(value);
                    }
                    Ok(())
                }
                other => Err(type_mismatch(key, ValueKind::List, other.kind())),
            },
            None => {
                let list = CacheValue::List(vec![value]);
                self.add(key.to_string(), list, self.default_ttl, now_ms);
                Ok(())
            }
        }
    }

    // == Remove From Array ==
    /// Removes the first element equal to `value` from a list value.
    ///
    /// No-op when the key is absent or the element is not found.
    pub fn remove_from_array(&mut self, key: &str, value: &CacheValue, now_ms: u64) -> Result<()> {
        self.evict_if_expired(key, now_ms);

        match self.entries.get_mut(key) {
            Some(entry) => match &mut entry.value {
                CacheValue::List(items) => {
                    if let Some(pos) = items.iter().position(|item| item == value) {
                        items.remove(pos);
                    }
                    Ok(())
                }
                other => Err(type_mismatch(key, ValueKind::List, other.kind())),
            },
            None => Ok(()),
        }
    }

    // == Get All ==
    /// Evicts every expired entry and returns the surviving key/value pairs.
    pub fn get_all(&mut self, now_ms: u64) -> HashMap<String, CacheValue> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now_ms));

        let evicted = before - self.entries.len();
        if evicted > 0 {
            self.stats.expirations += evicted as u64;
            debug!("Lazy expiration: evicted {} entries", evicted);
        }

        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Clear ==
    /// Discards all entries regardless of expiry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Time To Live ==
    /// Remaining TTL in whole seconds for a live entry. Does not evict.
    pub fn ttl_remaining(&self, key: &str, now_ms: u64) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now_ms))
            .map(|entry| entry.ttl_remaining_ms(now_ms) / 1000)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of stored entries, including expired entries that
    /// have not been accessed since they expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes `key` if its entry has expired. Returns whether it did.
    fn evict_if_expired(&mut self, key: &str, now_ms: u64) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now_ms));

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            debug!("Lazy expiration: evicted key '{}'", key);
        }
        expired
    }
}

fn type_mismatch(key: &str, expected: ValueKind, found: ValueKind) -> CacheError {
    warn!(
        "Rejected {} operation on key '{}' holding a {}",
        expected, key, found
    );
    CacheError::TypeMismatch {
        key: key.to_string(),
        expected,
        found,
    }
}

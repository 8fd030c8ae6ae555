//! Cache Handle Module
//!
//! Thread-safe, cloneable handle over a `CacheStore`. Clones share the
//! same entries; every operation runs under one mutex per cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::cache::{CacheStats, CacheStore, CacheValue, DEFAULT_TTL_SECS};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;

// == Cache ==
/// Shared cache instance with lazy TTL expiration.
///
/// # Example
/// ```
/// use tenant_cache::Cache;
///
/// let cache = Cache::new();
/// cache.add("greeting", "hello", 60);
/// assert_eq!(cache.get("greeting"), Some("hello".into()));
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<Mutex<CacheStore>>,
    clock: Arc<dyn Clock>,
}

impl Cache {
    // == Constructors ==
    /// Creates an empty cache on the system clock with the default TTL.
    pub fn new() -> Self {
        Self::with_options(DEFAULT_TTL_SECS, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_options(DEFAULT_TTL_SECS, clock)
    }

    /// Creates an empty cache using the configured default TTL.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(config.default_ttl, clock)
    }

    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL in seconds for entries created by
    ///   `update_property` and `add_to_array`
    /// * `clock` - Time source for TTL arithmetic
    pub fn with_options(default_ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::new(default_ttl))),
            clock,
        }
    }

    // == Identity ==
    /// Returns true if both handles refer to the same cache instance.
    pub fn ptr_eq(&self, other: &Cache) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    // == Operations ==
    /// Creates or overwrites the entry for `key`, expiring `ttl_seconds` from now.
    pub fn add(&self, key: impl Into<String>, value: impl Into<CacheValue>, ttl_seconds: u64) {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.add(key.into(), value.into().normalized(), ttl_seconds, now);
    }

    /// Returns the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.get(key, now)
    }

    /// Refreshes the value and expiry of `key`, creating it when missing.
    pub fn replace(&self, key: &str, value: impl Into<CacheValue>, ttl_seconds: u64) {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.replace(key, value.into().normalized(), ttl_seconds, now);
    }

    /// Removes `key`. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        self.lock().delete(key);
    }

    /// Alias of [`Cache::delete`].
    pub fn remove(&self, key: &str) {
        self.delete(key);
    }

    /// Sets `property` on the record stored at `key`.
    ///
    /// Creates `{property: value}` with the default TTL when `key` is missing.
    /// Fails with `TypeMismatch` when the stored value is not a record.
    pub fn update_property(
        &self,
        key: &str,
        property: impl Into<String>,
        value: impl Into<CacheValue>,
    ) -> Result<()> {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.update_property(key, property.into(), value.into().normalized(), now)
    }

    /// Appends `value` to the list stored at `key`.
    ///
    /// With `unique`, equal elements are not appended twice. Creates a
    /// one-element list with the default TTL when `key` is missing.
    pub fn add_to_array(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        unique: bool,
    ) -> Result<()> {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.add_to_array(key, value.into().normalized(), unique, now)
    }

    /// Removes the first element equal to `value` from the list at `key`.
    pub fn remove_from_array(&self, key: &str, value: impl Into<CacheValue>) -> Result<()> {
        let value = value.into().normalized();
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.remove_from_array(key, &value, now)
    }

    /// Returns every live entry, evicting the expired ones.
    pub fn get_all(&self) -> HashMap<String, CacheValue> {
        let mut store = self.lock();
        let now = self.clock.now_ms();
        store.get_all(now)
    }

    /// Discards all entries.
    pub fn clear(&self) {
        let dropped = self.lock().clear();
        info!("Cache cleared: dropped {} entries", dropped);
    }

    /// Remaining TTL in seconds of a live entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let store = self.lock();
        store.ttl_remaining(key, self.clock.now_ms())
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Number of stored entries, including expired entries not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic inside one operation leaves the map consistent, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn manual_cache() -> (Cache, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (Cache::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_add_and_get() {
        let (cache, _) = manual_cache();

        cache.add("k", "v", 60);
        assert_eq!(cache.get("k"), Some(CacheValue::from("v")));
    }

    #[test]
    fn test_expires_after_ttl() {
        let (cache, clock) = manual_cache();

        cache.add("k", 1, 60);
        clock.advance_secs(59);
        assert!(cache.get("k").is_some());

        clock.advance_secs(1);
        assert_eq!(cache.get("k"), None);
        assert!(!cache.get_all().contains_key("k"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let (cache, _) = manual_cache();
        let other = cache.clone();

        other.add("shared", true, 60);

        assert!(cache.ptr_eq(&other));
        assert_eq!(cache.get("shared"), Some(CacheValue::from(true)));
    }

    #[test]
    fn test_independent_caches_do_not_share() {
        let a = Cache::new();
        let b = Cache::new();

        a.add("x", 1, 60);

        assert!(!a.ptr_eq(&b));
        assert_eq!(b.get("x"), None);
    }

    #[test]
    fn test_replace_matches_delete_then_add() {
        let (replaced, _) = manual_cache();
        let (rebuilt, _) = manual_cache();

        replaced.add("k", "v1", 10);
        replaced.replace("k", "v2", 30);

        rebuilt.add("k", "v1", 10);
        rebuilt.delete("k");
        rebuilt.add("k", "v2", 30);

        assert_eq!(replaced.get_all(), rebuilt.get_all());
        assert_eq!(replaced.ttl_remaining("k"), rebuilt.ttl_remaining("k"));
    }

    #[test]
    fn test_update_property_uses_configured_default_ttl() {
        let clock = ManualClock::new(0);
        let config = Config { default_ttl: 5 };
        let cache = Cache::from_config(&config, Arc::new(clock.clone()));

        cache.update_property("session", "user", "ana").unwrap();
        assert_eq!(cache.ttl_remaining("session"), Some(5));

        clock.advance_secs(5);
        assert_eq!(cache.get("session"), None);
    }

    #[test]
    fn test_array_helpers() {
        let (cache, _) = manual_cache();

        cache.add_to_array("members", "a", true).unwrap();
        cache.add_to_array("members", "b", true).unwrap();
        cache.add_to_array("members", "a", true).unwrap();
        cache.remove_from_array("members", "a").unwrap();

        assert_eq!(cache.get("members").map(|v| v.to_json()), Some(json!(["b"])));
    }

    #[test]
    fn test_container_scalar_stored_as_record() {
        let (cache, _) = manual_cache();

        cache.add("session", CacheValue::Scalar(json!({"a": 1})), 60);
        cache.update_property("session", "b", 2).unwrap();

        let stored = cache.get("session").unwrap();
        assert_eq!(stored.kind(), crate::cache::ValueKind::Record);
        assert_eq!(stored.to_json(), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_remove_alias() {
        let (cache, _) = manual_cache();

        cache.add("k", 1, 60);
        cache.remove("k");
        cache.remove("k");

        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_clear_drops_everything() {
        let (cache, _) = manual_cache();

        cache.add("a", 1, 60);
        cache.add("b", 2, 60);
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get_all().is_empty());
    }
}

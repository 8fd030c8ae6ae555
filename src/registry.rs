//! Tenant Registry Module
//!
//! Hands out one isolated [`Cache`] per tenant (account) id, created on first
//! access, plus a tenant-less default cache. The registry never looks inside
//! the caches it owns.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::cache::{Cache, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Registry ==
/// Owner of every tenant cache in the process.
///
/// Construct one at startup and pass it (or an `Arc` of it) to the components
/// that need tenant-scoped caching.
///
/// # Example
/// ```
/// use tenant_cache::CacheRegistry;
///
/// let registry = CacheRegistry::new();
/// registry.cache_for("acme").unwrap().add("x", 1, 60);
///
/// assert!(registry.cache_for("globex").unwrap().get("x").is_none());
/// assert!(registry.cache_for("").is_err());
/// ```
#[derive(Debug)]
pub struct CacheRegistry {
    /// Tenant id -> cache
    tenants: RwLock<HashMap<String, Cache>>,
    /// Cache for call sites without tenant context
    default: Cache,
    /// Time source shared with every cache created here
    clock: Arc<dyn Clock>,
    /// TTL in seconds for implicitly created entries
    default_ttl: u64,
}

impl CacheRegistry {
    // == Constructors ==
    /// Creates a registry on the system clock with default configuration.
    pub fn new() -> Self {
        Self::with_config(&Config::default(), Arc::new(SystemClock))
    }

    /// Creates a registry on the system clock using `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_config(config, Arc::new(SystemClock))
    }

    /// Creates a registry whose caches read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(&Config::default(), clock)
    }

    pub fn with_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            default: Cache::from_config(config, Arc::clone(&clock)),
            clock,
            default_ttl: config.default_ttl,
        }
    }

    // == Default Cache ==
    /// Returns the tenant-less cache. It shares no entries with any tenant.
    pub fn default_cache(&self) -> Cache {
        self.default.clone()
    }

    // == Get Or Create ==
    /// Returns the cache for `tenant_id`, creating it on first access.
    ///
    /// Repeated calls return handles to the same instance. Concurrent first
    /// access from several threads still publishes exactly one cache.
    ///
    /// # Errors
    /// `InvalidArgument` if `tenant_id` is empty.
    pub fn cache_for(&self, tenant_id: &str) -> Result<Cache> {
        if tenant_id.is_empty() {
            return Err(CacheError::InvalidArgument(
                "tenant id must not be empty".to_string(),
            ));
        }

        if let Some(cache) = self.read().get(tenant_id) {
            return Ok(cache.clone());
        }

        // Another caller may have created it between the two locks; the
        // entry API keeps whichever instance got there first.
        let mut tenants = self.write();
        let cache = tenants.entry(tenant_id.to_string()).or_insert_with(|| {
            debug!("Creating cache for tenant '{}'", tenant_id);
            Cache::with_options(self.default_ttl, Arc::clone(&self.clock))
        });
        Ok(cache.clone())
    }

    /// Same as [`cache_for`](Self::cache_for) for call sites holding an
    /// optional account id; `None` is rejected like an empty id.
    pub fn cache_for_account(&self, tenant_id: Option<&str>) -> Result<Cache> {
        match tenant_id {
            Some(id) => self.cache_for(id),
            None => Err(CacheError::InvalidArgument(
                "tenant id is required".to_string(),
            )),
        }
    }

    // == Snapshots ==
    /// Returns every tenant cache created so far. Does not evict anything.
    pub fn all_caches(&self) -> HashMap<String, Cache> {
        self.read().clone()
    }

    pub fn tenant_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn tenant_count(&self) -> usize {
        self.read().len()
    }

    /// Statistics of every tenant cache.
    pub fn stats(&self) -> HashMap<String, CacheStats> {
        self.read()
            .iter()
            .map(|(id, cache)| (id.clone(), cache.stats()))
            .collect()
    }

    // == Administrative Reset ==
    /// Forgets the cache of one tenant. The next `cache_for` builds a new one.
    pub fn remove_tenant(&self, tenant_id: &str) -> Option<Cache> {
        let removed = self.write().remove(tenant_id);
        if removed.is_some() {
            info!("Removed cache for tenant '{}'", tenant_id);
        }
        removed
    }

    /// Forgets every tenant cache. The default cache is left untouched.
    pub fn reset(&self) {
        let dropped = {
            let mut tenants = self.write();
            let count = tenants.len();
            tenants.clear();
            count
        };
        info!("Registry reset: dropped {} tenant caches", dropped);
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Cache>> {
        self.tenants.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Cache>> {
        self.tenants.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

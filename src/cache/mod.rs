//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration and three value
//! shapes: opaque scalars, records patched by property, and lists.

mod entry;
mod handle;
mod stats;
mod store;
mod value;


// Re-export public types
pub(crate) use entry::CacheEntry;
pub use handle::Cache;
pub use stats::CacheStats;
pub(crate) use store::CacheStore;
pub use value::{CacheValue, ValueKind};

// == Public Constants ==
/// TTL in seconds for entries created implicitly by `update_property` and
/// `add_to_array`
pub const DEFAULT_TTL_SECS: u64 = 60;

//! Tenant Cache - per-account in-memory key/value cache
//!
//! Holds transient session and conversation state with lazy TTL expiration,
//! one isolated cache per tenant plus a tenant-less default cache.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod registry;

pub use cache::{Cache, CacheStats, CacheValue, ValueKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use registry::CacheRegistry;

//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_TTL_SECS;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL in seconds for entries created implicitly by `update_property`
    /// and `add_to_array`
    pub default_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Implicit entry TTL in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, 60);
    }

    // Both env cases live in one test so they cannot race each other.
    #[test]
    fn test_config_from_env() {
        env::remove_var("CACHE_DEFAULT_TTL");
        assert_eq!(Config::from_env().default_ttl, 60);

        env::set_var("CACHE_DEFAULT_TTL", "120");
        assert_eq!(Config::from_env().default_ttl, 120);

        env::set_var("CACHE_DEFAULT_TTL", "not-a-number");
        assert_eq!(Config::from_env().default_ttl, 60);

        env::remove_var("CACHE_DEFAULT_TTL");
    }
}

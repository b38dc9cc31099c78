//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Entitlement ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Policy cache configuration.
    #[serde(default)]
    pub policy_cache: CacheConfig,
}

/// Entitlement ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum attempts to acquire an entitlement slot under contention
    /// before surfacing a transient conflict.
    #[serde(default = "default_max_slot_retries")]
    pub max_slot_retries: u32,
}

fn default_max_slot_retries() -> u32 {
    64
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_slot_retries: default_max_slot_retries(),
        }
    }
}

/// Policy cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached policies.
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
    /// Time-to-live for cached policies, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_capacity() -> u64 {
    256
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources are layered: `config/default`, then `config/<RUN_MODE>`, then
    /// `ABSENTIA__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ABSENTIA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

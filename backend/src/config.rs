//! Configuration management for the Warehouse Inventory backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with WMS__ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Inventory and purchase settings
    pub inventory: InventoryConfig,

    /// Analytics recording settings
    pub analytics: AnalyticsConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Upper bound for one purchase transaction, in seconds
    pub purchase_timeout_secs: u64,

    /// Page size used when a listing request has none
    pub default_page_limit: u32,
}

impl InventoryConfig {
    pub fn purchase_timeout(&self) -> Duration {
        Duration::from_secs(self.purchase_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Pending sale batches kept before new ones are dropped
    pub queue_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WMS__ prefix)
            .add_source(
                Environment::with_prefix("WMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    fn defaults(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.run_migrations", environment == "development")?
            .set_default("inventory.purchase_timeout_secs", 10)?
            .set_default("inventory.default_page_limit", 10)?
            .set_default("analytics.queue_capacity", 1024)?
            .set_default("logging.json", false)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            purchase_timeout_secs: 10,
            default_page_limit: shared::DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

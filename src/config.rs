//! Catalog configuration.
//!
//! Dashboard tunables are loaded from `config/config.toml` (optional) with
//! environment variables under the `STOCKROOM` prefix as a fallback, e.g.
//! `STOCKROOM__CATALOG__LOW_STOCK_THRESHOLD=10`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Inventory strictly below this counts as low stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    /// Maximum rows returned by the low-stock listing.
    #[serde(default = "default_low_stock_limit")]
    pub low_stock_limit: usize,
    /// Maximum rows returned by the recent-products listing.
    #[serde(default = "default_recent_products_limit")]
    pub recent_products_limit: usize,
    /// Per-owner rollup is truncated to this many owners.
    #[serde(default = "default_top_owners_limit")]
    pub top_owners_limit: usize,
    /// Trailing window for monthly creation counts.
    #[serde(default = "default_trailing_months")]
    pub trailing_months: u32,
}

fn default_low_stock_threshold() -> i32 {
    20
}

fn default_low_stock_limit() -> usize {
    15
}

fn default_recent_products_limit() -> usize {
    5
}

fn default_top_owners_limit() -> usize {
    5
}

fn default_trailing_months() -> u32 {
    6
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            low_stock_limit: default_low_stock_limit(),
            recent_products_limit: default_recent_products_limit(),
            top_owners_limit: default_top_owners_limit(),
            trailing_months: default_trailing_months(),
        }
    }
}

impl CatalogConfig {
    /// Load the catalog configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/config.toml").required(false))
            .add_source(Environment::with_prefix("STOCKROOM").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // If the file existed but was unreadable, log and retry with env only
                if std::path::Path::new("config/config.toml").exists() {
                    log::warn!("failed to load config file, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix("STOCKROOM").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        // A missing [catalog] section just means defaults across the board
        match settings.get::<CatalogConfig>("catalog") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(CatalogConfig::default()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let cfg = CatalogConfig::default();
        assert_eq!(cfg.low_stock_threshold, 20);
        assert_eq!(cfg.low_stock_limit, 15);
        assert_eq!(cfg.recent_products_limit, 5);
        assert_eq!(cfg.top_owners_limit, 5);
        assert_eq!(cfg.trailing_months, 6);
    }
}

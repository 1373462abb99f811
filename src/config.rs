use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path; unset keeps all state in memory.
    pub database_path: Option<PathBuf>,
    /// Interval between price ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Price noise band as a fraction of the base price (0.01 = ±1%).
    pub price_band_pct: f64,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Largest quantity a single order may carry.
    pub max_order_quantity: u64,
    /// Clear the user's ledger when they log out.
    pub reset_on_logout: bool,
    /// JSON file overriding the built-in instrument list.
    pub instruments_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from any variable source. Missing or unparseable
    /// values fall back to defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(3001),
            database_path: non_empty("DATABASE_PATH").map(PathBuf::from),
            tick_interval_ms: var("TICK_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(1000),
            price_band_pct: var("PRICE_BAND_PCT")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|pct| pct.is_finite() && *pct >= 0.0 && *pct < 1.0)
                .unwrap_or(0.01),
            session_ttl_hours: var("SESSION_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|hours| *hours > 0)
                .unwrap_or(24),
            max_order_quantity: var("MAX_ORDER_QUANTITY")
                .and_then(|v| v.parse().ok())
                .filter(|qty| *qty > 0)
                .unwrap_or(100_000),
            reset_on_logout: var("RESET_ON_LOGOUT")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            instruments_file: non_empty("INSTRUMENTS_FILE").map(PathBuf::from),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

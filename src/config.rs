use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::domain::Objective;
use crate::engine::DEFAULT_MAX_ATTEMPTS;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub price_source: PriceSourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Age after which a cached price counts as stale
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum simultaneous price requests (also the wave size)
    #[serde(default = "default_refresh_concurrency")]
    pub refresh_concurrency: usize,
    /// Pause between refresh waves in milliseconds
    #[serde(default = "default_wave_delay_ms")]
    pub wave_delay_ms: u64,
    /// Deadline for one batch refresh (0 = no deadline)
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
}

fn default_ttl_secs() -> u64 {
    900
}

fn default_refresh_concurrency() -> usize {
    5
}

fn default_wave_delay_ms() -> u64 {
    250
}

fn default_refresh_timeout_ms() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            refresh_concurrency: default_refresh_concurrency(),
            wave_delay_ms: default_wave_delay_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    /// Attempts per segment before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed reshuffle seed; unset draws from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Cheapest eligible candidates refreshed for a high-priority segment
    #[serde(default = "default_refresh_top_k")]
    pub refresh_top_k: usize,
    #[serde(default)]
    pub objective: Objective,
    #[serde(default = "default_allow_alt_positions")]
    pub allow_alt_positions: bool,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_refresh_top_k() -> usize {
    25
}

fn default_allow_alt_positions() -> bool {
    true
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            seed: None,
            refresh_top_k: default_refresh_top_k(),
            objective: Objective::default(),
            allow_alt_positions: default_allow_alt_positions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceSourceConfig {
    /// Price endpoint root; requests go to `{base_url}/{platform}/{id}`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Market platform (ps, xbox, pc)
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/prices".to_string()
}

fn default_platform() -> String {
    "ps".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            platform: default_platform(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rolling log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("solver.max_attempts", DEFAULT_MAX_ATTEMPTS as i64)?
            .set_default("cache.refresh_concurrency", 5)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SBC_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SBC_CACHE__TTL_SECS, etc.)
            .add_source(
                Environment::with_prefix("SBC")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.cache.ttl_secs == 0 {
            errors.push("cache.ttl_secs must be positive".to_string());
        }

        if self.cache.refresh_concurrency == 0 {
            errors.push("cache.refresh_concurrency must be at least 1".to_string());
        }

        if self.solver.max_attempts == 0 {
            errors.push("solver.max_attempts must be at least 1".to_string());
        }

        if url::Url::parse(&self.price_source.base_url).is_err() {
            errors.push(format!(
                "price_source.base_url is not a valid URL: {}",
                self.price_source.base_url
            ));
        }

        if self.price_source.platform.trim().is_empty() {
            errors.push("price_source.platform must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

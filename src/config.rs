//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,
}

/// File locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one SQLite file per client
    pub data_dir: PathBuf,
    /// Directory rendered network artifacts are written to
    pub plots_dir: PathBuf,
    /// Client stores held open before the least recently used are closed
    pub max_open_stores: usize,
    /// Seconds a client store may sit unused before it is closed
    pub store_idle_secs: u64,
    /// Rendered artifacts kept, newest first
    pub max_plots: usize,
    /// Seconds a rendered artifact is kept
    pub plot_max_age_secs: u64,
    /// Seconds between idle-store and artifact sweeps
    pub sweep_interval_secs: u64,
}

impl StorageConfig {
    pub fn store_limits(&self) -> crate::data::StoreLimits {
        crate::data::StoreLimits {
            max_open: self.max_open_stores,
            idle_ttl: Duration::from_secs(self.store_idle_secs),
        }
    }

    pub fn plot_retention(&self) -> crate::storage::PlotRetention {
        crate::storage::PlotRetention {
            max_age: Duration::from_secs(self.plot_max_age_secs),
            max_files: self.max_plots,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Analysis tuning
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Destination frequency threshold for the common/unique filter
    pub threshold: usize,
    /// Weight applied to following-derived degree in the combined ranking
    pub following_weight: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (FOLLOWGRAPH__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_upload_bytes", 1024 * 1024)?
            .set_default("storage.data_dir", "data/clients")?
            .set_default("storage.plots_dir", "data/plots")?
            .set_default("storage.max_open_stores", 256)?
            .set_default("storage.store_idle_secs", 600)?
            .set_default("storage.max_plots", 1000)?
            .set_default("storage.plot_max_age_secs", 3600)?
            .set_default("storage.sweep_interval_secs", 60)?
            .set_default("analysis.threshold", crate::graph::DEFAULT_THRESHOLD as i64)?
            .set_default("analysis.following_weight", 0.5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("FOLLOWGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(crate::error::AppError::Config(
                "storage.data_dir must not be empty".to_string(),
            ));
        }

        if self.storage.plots_dir.as_os_str().is_empty() {
            return Err(crate::error::AppError::Config(
                "storage.plots_dir must not be empty".to_string(),
            ));
        }

        for (key, value) in [
            ("storage.max_open_stores", self.storage.max_open_stores as u64),
            ("storage.store_idle_secs", self.storage.store_idle_secs),
            ("storage.max_plots", self.storage.max_plots as u64),
            ("storage.plot_max_age_secs", self.storage.plot_max_age_secs),
            ("storage.sweep_interval_secs", self.storage.sweep_interval_secs),
        ] {
            if value == 0 {
                return Err(crate::error::AppError::Config(format!(
                    "{key} must be greater than 0"
                )));
            }
        }

        let weight = self.analysis.following_weight;
        if !weight.is_finite() || weight < 0.0 {
            return Err(crate::error::AppError::Config(format!(
                "analysis.following_weight must be a non-negative number, got {weight}"
            )));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(crate::error::AppError::Config(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

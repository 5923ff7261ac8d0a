//! Configuration loading and data folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument / environment variable (handled by the binary's clap parser)
//! 2. TOML config file
//! 3. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default HTTP port for the awards service
pub const DEFAULT_PORT: u16 = 5800;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default directory scanned for a CSV file at startup
pub const DEFAULT_CSV_DIR: &str = "data";

/// Default environment label reported by the health endpoint
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "gra.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; anything missing falls back to the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Directory scanned for a CSV file to import on startup
    #[serde(default)]
    pub csv_dir: Option<PathBuf>,

    /// Environment label (development, staging, production...)
    #[serde(default)]
    pub environment: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
///
/// `None` means "not given", letting the TOML file or the default decide.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub csv_dir: Option<PathBuf>,
    pub environment: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub csv_dir: PathBuf,
    pub environment: String,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, the optional TOML file and built-in defaults
    pub fn resolve(overrides: ConfigOverrides, toml: Option<TomlConfig>) -> Self {
        let toml = toml.unwrap_or_default();

        let database_path = overrides
            .database_path
            .or(toml.database_path)
            .unwrap_or_else(|| default_data_folder().join(DATABASE_FILE_NAME));

        Self {
            database_path,
            host: overrides
                .host
                .or(toml.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            csv_dir: overrides
                .csv_dir
                .or(toml.csv_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR)),
            environment: overrides
                .environment
                .or(toml.environment)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        }
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Get OS-dependent default data folder path
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gra"))
        .unwrap_or_else(|| PathBuf::from("./gra_data"))
}

//! Run configuration and its resolution order
//!
//! Every field resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The connection string has no compiled default; a run without one fails
//! before any network activity.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable holding the Postgres connection string
pub const CONNECTION_STRING_ENV: &str = "POSTGRES_URL";
/// Environment variable overriding the image staging file
pub const DOWNLOAD_PATH_ENV: &str = "ARTPAL_DOWNLOAD_PATH";
/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "ARTPAL_LOG_LEVEL";

/// Staging file for the downloaded image, relative to the working directory
pub const DEFAULT_DOWNLOAD_PATH: &str = "downloads/temp.jpg";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_USER_AGENT: &str = concat!("artpal/", env!("CARGO_PKG_VERSION"));

/// Tunable clustering parameters for palette extraction
///
/// Distances are fractions of the full range of their axis (0.0-1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    /// Normalized RGB distance under which two colours are merged
    pub distance: f64,
    /// Hue distance (fraction of the colour wheel) for the similarity filter
    pub hue_distance: f64,
    /// Saturation distance for the similarity filter
    pub saturation_distance: f64,
    /// Lightness distance for the similarity filter
    pub lightness_distance: f64,
    /// Upper bound on the number of pixels sampled from one image
    pub max_samples: usize,
    /// Pixels with alpha below this value are ignored
    pub min_alpha: u8,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            distance: 0.13,
            hue_distance: 0.05,
            saturation_distance: 0.2,
            lightness_distance: 0.2,
            max_samples: 64_000,
            min_alpha: 250,
        }
    }
}

impl PaletteOptions {
    /// Reject values the clustering cannot work with
    pub fn validate(&self) -> Result<()> {
        let ranged = [
            ("distance", self.distance),
            ("hue_distance", self.hue_distance),
            ("saturation_distance", self.saturation_distance),
            ("lightness_distance", self.lightness_distance),
        ];
        for (name, value) in ranged {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "palette.{} must be within 0.0-1.0 (got {})",
                    name, value
                )));
            }
        }
        if self.max_samples == 0 {
            return Err(Error::Config(
                "palette.max_samples must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub postgres_url: Option<String>,
    pub download_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub user_agent: Option<String>,
    pub require_https: Option<bool>,
    pub palette: Option<PaletteOptions>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub connection_string: Option<String>,
    pub download_path: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Explicit config file; a missing or invalid file is an error
    pub config_file: Option<PathBuf>,
}

/// Configuration handed to the gateway, fetcher and extractor at construction
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Postgres connection string for the `art` table
    pub connection_string: String,
    /// Local staging file, overwritten on every run
    pub download_path: PathBuf,
    pub user_agent: String,
    /// Refuse image and page URLs that are not `https`
    pub require_https: bool,
    pub log_level: String,
    pub palette: PaletteOptions,
}

impl CrawlConfig {
    /// Configuration with compiled defaults for everything but the store
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            download_path: PathBuf::from(DEFAULT_DOWNLOAD_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            require_https: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            palette: PaletteOptions::default(),
        }
    }

    /// Resolve every field from CLI, environment, TOML file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => TomlConfig::load(path)?,
            None => load_default_config_file(),
        };

        let connection_string = overrides
            .connection_string
            .clone()
            .or_else(|| env_value(CONNECTION_STRING_ENV))
            .or(file.postgres_url)
            .ok_or_else(|| {
                Error::Config(format!(
                    "No database connection string (use --postgres-url, {} or postgres_url in config.toml)",
                    CONNECTION_STRING_ENV
                ))
            })?;

        let download_path = overrides
            .download_path
            .clone()
            .or_else(|| env_value(DOWNLOAD_PATH_ENV).map(PathBuf::from))
            .or(file.download_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_PATH));

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| env_value(LOG_LEVEL_ENV))
            .or(file.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let palette = file.palette.unwrap_or_default();
        palette.validate()?;

        Ok(Self {
            connection_string,
            download_path,
            user_agent: file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            require_https: file.require_https.unwrap_or(true),
            log_level,
            palette,
        })
    }
}

/// Non-empty environment variable value
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform config file location (`<config_dir>/artpal/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("artpal").join("config.toml"))
}

/// Missing or unreadable default config falls back to compiled defaults
fn load_default_config_file() -> TomlConfig {
    let Some(path) = default_config_path() else {
        return TomlConfig::default();
    };
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return TomlConfig::default();
    }
    match TomlConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    }
}

//! Configuration loading and config file resolution
//!
//! Settings come from a single TOML file. Every table and every key is
//! optional; anything missing falls back to the built-in defaults below.
//!
//! Config file priority order:
//! 1. Command-line argument (highest priority)
//! 2. `LANDING_CONFIG` environment variable
//! 3. `<platform config dir>/landing/config.toml`
//! 4. Built-in defaults (no file)
//!
//! A file named explicitly (1 or 2) must exist and parse. The implicit
//! platform file never terminates the program: missing or broken, it degrades
//! to defaults and the returned [`LoadOutcome`] records why.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LANDING_CONFIG";

/// Default SpaceX v4 launches endpoint
pub const DEFAULT_LAUNCHES_URL: &str = "https://api.spacexdata.com/v4/launches";

/// Default SpaceX v4 payloads endpoint
pub const DEFAULT_PAYLOADS_URL: &str = "https://api.spacexdata.com/v4/payloads";

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub paths: PathsConfig,
    pub cleaning: CleaningConfig,
    pub features: FeaturesConfig,
    pub logging: LoggingConfig,
}

/// Upstream API endpoints and HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub launches_url: String,
    pub payloads_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            launches_url: DEFAULT_LAUNCHES_URL.to_string(),
            payloads_url: DEFAULT_PAYLOADS_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("landing-etl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Data directories used by the CLI for default input/output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_dir: PathBuf,
    pub interim_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            interim_dir: PathBuf::from("data/interim"),
            processed_dir: PathBuf::from("data/processed"),
        }
    }
}

/// Missing-value substitution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Label written for missing orbit and launch site values
    pub unknown_label: String,
    /// Payload mass used when no flight in a batch has a known mass
    pub missing_mass_fallback_kg: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            unknown_label: "Unknown".to_string(),
            missing_mass_fallback_kg: 0.0,
        }
    }
}

/// Train/test split settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Fraction of rows held out for testing, in (0, 1)
    pub test_size: f64,
    /// Shuffle seed
    pub random_state: u64,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.api.launches_url.trim().is_empty() {
            return Err(Error::Config("api.launches_url must not be empty".to_string()));
        }
        if self.api.payloads_url.trim().is_empty() {
            return Err(Error::Config("api.payloads_url must not be empty".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be positive".to_string()));
        }
        if !(self.features.test_size > 0.0 && self.features.test_size < 1.0) {
            return Err(Error::Config(format!(
                "features.test_size must be in (0, 1), got {}",
                self.features.test_size
            )));
        }
        if !self.cleaning.missing_mass_fallback_kg.is_finite() {
            return Err(Error::Config(
                "cleaning.missing_mass_fallback_kg must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or via `LANDING_CONFIG`; must load
    Explicit(PathBuf),
    /// Platform default location; may be absent
    Implicit(PathBuf),
    /// No file at all
    Defaults,
}

/// Decide which config file to use, without reading it
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    match default_config_path() {
        Some(path) => ConfigSource::Implicit(path),
        None => ConfigSource::Defaults,
    }
}

/// `<platform config dir>/landing/config.toml`, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("landing").join("config.toml"))
}

/// How a configuration load ended up.
///
/// Loading happens before the log subscriber exists, so the outcome is
/// returned to the caller and reported with [`LoadOutcome::log`] once
/// logging is up.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file at this path was read and validated
    Loaded(PathBuf),
    /// The implicit file was absent (`reason` is `None`) or unusable;
    /// built-in defaults are in effect
    Defaulted { path: PathBuf, reason: Option<Error> },
    /// No file was consulted
    Builtin,
}

impl LoadOutcome {
    /// Path of the file whose settings are in effect, if any
    pub fn loaded_path(&self) -> Option<&Path> {
        match self {
            LoadOutcome::Loaded(path) => Some(path.as_path()),
            _ => None,
        }
    }

    pub fn log(&self) {
        match self {
            LoadOutcome::Loaded(path) => {
                info!(path = %path.display(), "Configuration loaded");
            }
            LoadOutcome::Defaulted { path, reason: None } => {
                info!(path = %path.display(), "No config file, using built-in defaults");
            }
            LoadOutcome::Defaulted {
                path,
                reason: Some(e),
            } => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring invalid config file; using built-in defaults"
                );
            }
            LoadOutcome::Builtin => info!("Using built-in configuration defaults"),
        }
    }
}

/// Resolve and load the configuration, logging the outcome
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let (config, outcome) = load_from_source(&resolve_config_source(cli_arg))?;
    outcome.log();
    Ok(config)
}

/// Load configuration from an already resolved source.
///
/// Only an explicit source can fail; an implicit one degrades to defaults
/// and says why in the returned [`LoadOutcome`].
pub fn load_from_source(source: &ConfigSource) -> Result<(TomlConfig, LoadOutcome)> {
    match source {
        ConfigSource::Explicit(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Read config {} failed: {}", path.display(), e))
            })?;
            let config = TomlConfig::from_toml_str(&content)?;
            Ok((config, LoadOutcome::Loaded(path.clone())))
        }
        ConfigSource::Implicit(path) => {
            if !path.exists() {
                let outcome = LoadOutcome::Defaulted {
                    path: path.clone(),
                    reason: None,
                };
                return Ok((TomlConfig::default(), outcome));
            }
            let loaded = std::fs::read_to_string(path)
                .map_err(Error::from)
                .and_then(|content| TomlConfig::from_toml_str(&content));
            match loaded {
                Ok(config) => Ok((config, LoadOutcome::Loaded(path.clone()))),
                Err(e) => {
                    let outcome = LoadOutcome::Defaulted {
                        path: path.clone(),
                        reason: Some(e),
                    };
                    Ok((TomlConfig::default(), outcome))
                }
            }
        }
        ConfigSource::Defaults => Ok((TomlConfig::default(), LoadOutcome::Builtin)),
    }
}

/// Write configuration atomically: serialize to `<path>.tmp`, then rename.
///
/// Parent directories are created as needed.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, content)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(Error::Io(e));
    }
    Ok(())
}

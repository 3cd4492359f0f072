//! Configuration management.
//!
//! Configuration comes from an optional TOML file, then environment
//! overrides, then CLI flags (applied by the binary).
//!
//! ```toml
//! store_path = "/var/lib/vehiclestore/vehicles.json"
//! concurrency = "optimistic"
//! max_file_size = 10485760
//!
//! [logging]
//! format = "json"
//! level = "debug"
//! file = "/var/log/vehiclestore.log"
//! ```

use crate::storage::persistence::DEFAULT_MAX_FILE_SIZE;
use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the store when no path is configured.
pub const DEFAULT_STORE_FILE: &str = "vehicles.json";

/// Environment variable naming the store file.
pub const STORE_PATH_ENV: &str = "VEHICLESTORE_STORE_PATH";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "VEHICLESTORE_CONFIG_PATH";

/// How mutating read-modify-write cycles are isolated from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyMode {
    /// No isolation. Overlapping cycles may silently lose updates.
    LastWriteWins,
    /// Cycles run one at a time behind a process-wide mutex.
    #[default]
    Serialized,
    /// Each write is checked against the revision its cycle read; a changed
    /// store fails the write with `Error::Conflict`.
    Optimistic,
}

impl ConcurrencyMode {
    /// Returns the config string for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last-write-wins",
            Self::Serialized => "serialized",
            Self::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcurrencyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "last-write-wins" | "lww" | "none" => Ok(Self::LastWriteWins),
            "serialized" | "mutex" | "lock" => Ok(Self::Serialized),
            "optimistic" | "revision" => Ok(Self::Optimistic),
            other => Err(Error::InvalidInput(format!(
                "unknown concurrency mode: {other}"
            ))),
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Default filter directive, e.g. "info" or "vehiclestore=debug".
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Store file path.
    pub store_path: Option<String>,
    /// Concurrency mode.
    pub concurrency: Option<ConcurrencyMode>,
    /// Maximum document size in bytes.
    pub max_file_size: Option<u64>,
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
}

/// Main configuration for vehiclestore.
#[derive(Debug, Clone)]
pub struct VehicleStoreConfig {
    /// Path to the JSON document.
    pub store_path: PathBuf,
    /// Isolation strategy for mutating operations.
    pub concurrency: ConcurrencyMode,
    /// Maximum accepted document size in bytes.
    pub max_file_size: u64,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for VehicleStoreConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            concurrency: ConcurrencyMode::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            logging: LoggingSettings::default(),
        }
    }
}

/// Returns `vehicles.json` next to the running executable.
///
/// Falls back to the working directory when the executable path is unknown.
#[must_use]
pub fn default_store_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map_or_else(
            || PathBuf::from(DEFAULT_STORE_FILE),
            |dir| dir.join(DEFAULT_STORE_FILE),
        )
}

impl VehicleStoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/vehiclestore/` on macOS)
    /// 2. XDG config dir (`~/.config/vehiclestore/`)
    ///
    /// Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if the first config file found cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        Self::load_first(&[
            base_dirs
                .config_dir()
                .join("vehiclestore")
                .join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("vehiclestore")
                .join("config.toml"),
        ])
    }

    /// Loads the first candidate that exists. A broken file is an error, not
    /// a reason to fall through to the next one.
    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        candidates
            .iter()
            .find(|p| p.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Converts a `ConfigFile` to `VehicleStoreConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(store_path) = file.store_path {
            config.store_path = PathBuf::from(store_path);
        }
        if let Some(mode) = file.concurrency {
            config.concurrency = mode;
        }
        if let Some(max) = file.max_file_size {
            config.max_file_size = max;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies `VEHICLESTORE_STORE_PATH` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(STORE_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => self.with_store_path(path.trim()),
            _ => self,
        }
    }

    /// Sets the store path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Sets the concurrency mode.
    #[must_use]
    pub const fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency = mode;
        self
    }
}

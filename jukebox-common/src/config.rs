//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a TOML file. Every field has a
//! built-in default, so a missing file is not an error: the service starts
//! with defaults and logs a warning.
//!
//! # Config file priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`JUKEBOX_CONFIG`)
//! 3. Platform config directory (`<config_dir>/jukebox/config.toml`)
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "JUKEBOX_CONFIG";

/// Maximum number of entries accepted from one playlist resolution
///
/// Serialized as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionLimit {
    Unlimited,
    Max(usize),
}

impl IngestionLimit {
    /// Parse the integer form used in config files and env vars
    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(IngestionLimit::Unlimited),
            v if v >= 0 => Ok(IngestionLimit::Max(v as usize)),
            v => Err(Error::Config(format!(
                "Invalid ingestion limit {} (expected -1 or a non-negative count)",
                v
            ))),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            IngestionLimit::Unlimited => -1,
            IngestionLimit::Max(n) => *n as i64,
        }
    }
}

impl Default for IngestionLimit {
    fn default() -> Self {
        IngestionLimit::Max(50)
    }
}

impl Serialize for IngestionLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for IngestionLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        IngestionLimit::from_i64(value).map_err(serde::de::Error::custom)
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Playlist ingestion limit (`-1` = unlimited)
    #[serde(default)]
    pub ingestion_limit: IngestionLimit,

    /// Back-to-back playback failures that halt auto-advance
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Initial volume for new sessions (0.0-1.0)
    #[serde(default = "default_volume")]
    pub default_volume: f32,

    /// Event bus buffer size
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Media resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Extractor executable
    #[serde(default = "default_resolver_program")]
    pub program: String,

    /// Cookie file passed to the extractor (optional)
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,

    /// How bare search terms are interpreted by the extractor
    #[serde(default = "default_search")]
    pub default_search: String,
}

/// Playback engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Player executable
    #[serde(default = "default_engine_program")]
    pub program: String,

    /// Extra arguments placed before the volume flag and locator
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,

    /// Volume flag prefix; the 0-100 level is appended
    #[serde(default = "default_volume_flag")]
    pub volume_flag: String,
}

fn default_port() -> u16 {
    5750
}

fn default_max_consecutive_errors() -> u32 {
    3
}

fn default_volume() -> f32 {
    0.5
}

fn default_event_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_resolver_program() -> String {
    "yt-dlp".to_string()
}

fn default_search() -> String {
    "auto".to_string()
}

fn default_engine_program() -> String {
    "mpv".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["--no-video".to_string(), "--really-quiet".to_string()]
}

fn default_volume_flag() -> String {
    "--volume=".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            ingestion_limit: IngestionLimit::default(),
            max_consecutive_errors: default_max_consecutive_errors(),
            default_volume: default_volume(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
            resolver: ResolverConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: default_resolver_program(),
            cookie_file: None,
            default_search: default_search(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: default_engine_args(),
            volume_flag: default_volume_flag(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()
    }

    /// Load from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the resolved config file, falling back to defaults
    ///
    /// A missing or unreadable file is logged and replaced by defaults. A file
    /// that exists but fails to parse or validate is an error.
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check invariants and normalize values
    pub fn validate(mut self) -> Result<Self> {
        if self.max_consecutive_errors == 0 {
            return Err(Error::Config(
                "max_consecutive_errors must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            warn!(
                "default_volume {} out of range, clamping to 0.0-1.0",
                self.default_volume
            );
            self.default_volume = self.default_volume.clamp(0.0, 1.0);
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// Drop a configured cookie file that does not exist
    pub fn discard_missing_cookie_file(&mut self) {
        if let Some(path) = &self.resolver.cookie_file {
            if path.exists() {
                info!("Using cookie file: {}", path.display());
            } else {
                warn!("Cookie file {} not found, ignoring...", path.display());
                self.resolver.cookie_file = None;
            }
        }
    }
}

/// Resolve which config file to read
///
/// Returns `None` when neither an explicit path nor a platform default exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory, only if the file is there
    default_config_path().filter(|p| p.exists())
}

/// `<config_dir>/jukebox/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

//! Optional TOML configuration for the runner.
//!
//! Every key is optional. Command-line flags override whatever the file sets.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

/// A breakpoint address written either as a number or as a `"0x…"` string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressValue {
    Number(u16),
    Text(String),
}

impl AddressValue {
    pub fn resolve(&self) -> Result<u16, ConfigError> {
        match self {
            AddressValue::Number(n) => Ok(*n),
            AddressValue::Text(s) => parse_address(s),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub bios: Option<PathBuf>,
    pub frames: Option<u32>,
    pub step_ceiling: Option<u64>,
    #[serde(default)]
    pub breakpoints: Vec<AddressValue>,
    pub output: Option<OutputFormat>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidAddress(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidAddress(s) => write!(f, "invalid address: {s:?}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::InvalidAddress(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Parse `0x1234`, `$1234` or decimal.
pub fn parse_address(text: &str) -> Result<u16, ConfigError> {
    let t = text.trim();
    let parsed = if let Some(hex) = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .or_else(|| t.strip_prefix('$'))
    {
        u16::from_str_radix(hex, 16)
    } else {
        t.parse()
    };
    parsed.map_err(|_| ConfigError::InvalidAddress(text.to_string()))
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/beamline/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("beamline").join("config.toml"))
    }

    /// Load `explicit` if given (must exist), else the default file if it
    /// exists, else an empty config.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn breakpoint_addresses(&self) -> Result<Vec<u16>, ConfigError> {
        self.breakpoints.iter().map(AddressValue::resolve).collect()
    }
}

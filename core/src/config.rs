//! Renderer configuration (probe.toml)
//!
//! Limits are per rendering mode plus two per-call budgets. The file is read
//! once when the host installs the bridge, never from a debugger call.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SEXP_PROBE_CONFIG";

/// File name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "probe.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Nodes visited per call before rendering is cut short
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Bytes of text returned per call
    #[serde(default = "default_max_output")]
    pub max_output: usize,
    #[serde(default = "ModeLimits::print", deserialize_with = "print_limits")]
    pub print: ModeLimits,
    #[serde(default = "ModeLimits::inspect", deserialize_with = "inspect_limits")]
    pub inspect: ModeLimits,
    #[serde(default = "ModeLimits::display", deserialize_with = "display_limits")]
    pub display: ModeLimits,
}

/// Limits for one rendering mode
///
/// Missing fields in a table keep that mode's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeLimits {
    /// Elements shown per container
    pub max_elements: usize,
    /// Container nesting shown before eliding
    pub max_depth: usize,
    /// Line width in characters
    pub width: usize,
}

/// A mode table as written in the file
#[derive(Deserialize)]
struct PartialLimits {
    max_elements: Option<usize>,
    max_depth: Option<usize>,
    width: Option<usize>,
}

impl PartialLimits {
    fn or(self, defaults: ModeLimits) -> ModeLimits {
        ModeLimits {
            max_elements: self.max_elements.unwrap_or(defaults.max_elements),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            width: self.width.unwrap_or(defaults.width),
        }
    }
}

fn print_limits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModeLimits, D::Error> {
    Ok(PartialLimits::deserialize(deserializer)?.or(ModeLimits::print()))
}

fn inspect_limits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModeLimits, D::Error> {
    Ok(PartialLimits::deserialize(deserializer)?.or(ModeLimits::inspect()))
}

fn display_limits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModeLimits, D::Error> {
    Ok(PartialLimits::deserialize(deserializer)?.or(ModeLimits::display()))
}

fn default_max_nodes() -> usize { 10_000 }
fn default_max_output() -> usize { 64 * 1024 }

impl ModeLimits {
    pub fn print() -> Self {
        Self {
            max_elements: 5,
            max_depth: 2,
            width: 80,
        }
    }

    pub fn inspect() -> Self {
        Self {
            max_elements: 50,
            max_depth: 6,
            width: 120,
        }
    }

    pub fn display() -> Self {
        Self {
            max_elements: 100,
            max_depth: 4,
            width: 80,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_output: default_max_output(),
            print: ModeLimits::print(),
            inspect: ModeLimits::inspect(),
            display: ModeLimits::display(),
        }
    }
}

impl ProbeConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "sexp-probe", "sexp-probe")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Resolve the config file: `$SEXP_PROBE_CONFIG`, then the platform config dir
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)),
    }
}

/// Load the config, falling back to defaults when absent or invalid
pub fn load() -> ProbeConfig {
    let Some(path) = config_path() else {
        return ProbeConfig::default();
    };
    if !path.exists() {
        tracing::debug!("no probe config at {}, using defaults", path.display());
        return ProbeConfig::default();
    }
    match ProbeConfig::from_path(&path) {
        Ok(config) => {
            tracing::info!("loaded probe config from {}", path.display());
            config
        }
        Err(err) => {
            tracing::warn!("{err}; using default probe config");
            ProbeConfig::default()
        }
    }
}

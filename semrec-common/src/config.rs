//! Configuration file model and discovery
//!
//! Config file lookup order:
//! 1. Explicit path (command-line argument)
//! 2. `SEMREC_CONFIG` environment variable
//! 3. `~/.config/semrec/config.toml` (platform config directory)
//! 4. `/etc/semrec/config.toml` (Linux only)
//!
//! An explicitly named file must exist. When no file is named and none of the
//! default locations exist, compiled defaults apply and `LoadedConfig::source`
//! is `None`. Loading happens before logging is initialized, so callers report
//! the outcome once tracing is up.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "SEMREC_CONFIG";

/// Raw TOML configuration
///
/// Every field is optional so that partial files are accepted; the engine
/// resolves the final values against environment variables and defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Newline-delimited file of source URIs
    pub source_file_path: Option<PathBuf>,
    /// Base path for RDF/XML output files
    pub output_file_path: Option<PathBuf>,
    /// Querier selection flag ("federated", "single", anything else = individual)
    pub type_recommendation: Option<String>,
    /// Number of buffered recommendations that triggers a flush
    pub flush_threshold: Option<usize>,
    /// Consecutive failed flushes tolerated before the buffer is dropped
    pub max_flush_attempts: Option<u32>,
    pub endpoints: EndpointsConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

/// `[endpoints]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Federation-aware SPARQL endpoint
    pub federated: Option<String>,
    /// Plain single triple-store endpoint
    pub single: Option<String>,
    /// Endpoints queried one by one by the individual querier
    pub individual: Vec<String>,
    /// Per-request timeout; unset means requests may block indefinitely
    pub request_timeout_secs: Option<u64>,
}

/// `[query]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// SPARQL template with `{uri}` and optional `{limit}` placeholders
    pub template: Option<String>,
    /// Value substituted for `{limit}`
    pub limit: Option<u32>,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter directive (e.g. "info", "semrec_engine=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Parsed configuration plus the file it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    /// `None` when no file was found and compiled defaults are in use
    pub source: Option<PathBuf>,
}

/// Load configuration following the lookup order in the module docs
pub fn load_config(cli_path: Option<&Path>) -> Result<LoadedConfig> {
    let path = match cli_path {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| default_config_paths().into_iter().find(|p| p.exists())),
    };

    match path {
        Some(path) => Ok(LoadedConfig {
            config: load_toml_config(&path)?,
            source: Some(path),
        }),
        None => Ok(LoadedConfig::default()),
    }
}

/// Read and parse one TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML {} failed: {}", path.display(), e)))?;
    Ok(config)
}

/// Candidate config file locations for the current platform
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("semrec").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/semrec/config.toml"));
    }

    paths
}

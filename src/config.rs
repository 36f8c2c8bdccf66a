//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `SGCOVID_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::{
    CaseSource, ColumnMapping, CountRange, FileSource, HttpSource, PipelineResult,
    DEFAULT_DATA_URL, DEFAULT_MAX_ROWS, DEFAULT_TOP_N,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Case data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Local CSV used instead of `url` when set
    pub file: Option<PathBuf>,

    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub columns: ColumnMapping,
}

fn default_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            file: None,
            max_rows: default_max_rows(),
            request_timeout_secs: None,
            columns: ColumnMapping::default(),
        }
    }
}

impl SourceConfig {
    /// Build the configured source: the local file if set, otherwise the URL
    pub fn build_source(&self) -> PipelineResult<Arc<dyn CaseSource>> {
        if let Some(path) = &self.file {
            return Ok(Arc::new(FileSource::new(path)));
        }

        let source = match self.request_timeout_secs {
            Some(secs) => HttpSource::with_timeout(&self.url, Duration::from_secs(secs))?,
            None => HttpSource::new(&self.url)?,
        };
        Ok(Arc::new(source))
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dashboard control settings
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Lowest value the count-range control accepts
    #[serde(default)]
    pub range_min: u32,

    /// Highest value the count-range control accepts
    #[serde(default = "default_range_max")]
    pub range_max: u32,

    #[serde(default = "default_low")]
    pub default_low: u32,

    #[serde(default = "default_high")]
    pub default_high: u32,

    /// Rows in the nationality table
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_range_max() -> u32 {
    200
}

fn default_low() -> u32 {
    1
}

fn default_high() -> u32 {
    50
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            range_min: 0,
            range_max: default_range_max(),
            default_low: default_low(),
            default_high: default_high(),
            top_n: default_top_n(),
        }
    }
}

impl DashboardConfig {
    /// Range shown before the user moves the control
    pub fn default_range(&self) -> Option<CountRange> {
        CountRange::new(self.default_low, self.default_high)
    }

    /// Whether both bounds of `range` sit inside the control limits
    pub fn allows(&self, range: CountRange) -> bool {
        self.range_min <= range.low && range.high <= self.range_max
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides looked up through `var`
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_overrides(var);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// Unreadable or invalid files are skipped with a warning. The
    /// environment-only fallback must itself be valid.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sgcovid").join("config.toml")),
            Some(PathBuf::from("/etc/sgcovid/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.max_rows == 0 {
            return Err(ConfigError::Invalid(
                "source.max_rows must be positive".to_string(),
            ));
        }

        let dash = &self.dashboard;
        if dash.range_min > dash.range_max {
            return Err(ConfigError::Invalid(
                "dashboard.range_min must not exceed dashboard.range_max".to_string(),
            ));
        }

        match dash.default_range() {
            Some(range) if dash.allows(range) => Ok(()),
            _ => Err(ConfigError::Invalid(format!(
                "dashboard default range ({}, {}) must be ordered and within [{}, {}]",
                dash.default_low, dash.default_high, dash.range_min, dash.range_max
            ))),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Source overrides
        if let Some(url) = var("SGCOVID_SOURCE_URL") {
            self.source.url = url;
        }
        if let Some(file) = var("SGCOVID_SOURCE_FILE") {
            self.source.file = Some(PathBuf::from(file));
        }
        if let Some(max_rows) = var("SGCOVID_MAX_ROWS") {
            if let Ok(n) = max_rows.parse() {
                self.source.max_rows = n;
            }
        }

        // API overrides
        if let Some(host) = var("SGCOVID_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("SGCOVID_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("SGCOVID_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SGCOVID_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# sgcovid Configuration
#
# Environment variables override these settings:
# - SGCOVID_SOURCE_URL
# - SGCOVID_SOURCE_FILE
# - SGCOVID_MAX_ROWS
# - SGCOVID_API_HOST
# - SGCOVID_API_PORT
# - SGCOVID_LOG_LEVEL
# - SGCOVID_LOG_FORMAT

[source]
# Remote case CSV
url = "{url}"

# Local CSV to read instead of the URL
# file = "./SingaporeCovid19April2020.csv"

# Maximum number of data rows read from the source
max_rows = {max_rows}

# Request timeout in seconds (no timeout when unset)
# request_timeout_secs = 30

[source.columns]
# Renames applied after column names are lower-cased
cluster_local = "location"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

[dashboard]
# Bounds of the case-count range control
range_min = 0
range_max = 200

# Range selected on first load
default_low = 1
default_high = 50

# Rows in the top locations by nationality table
top_n = {top_n}

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/sgcovid/sgcovid.log"
"#,
        url = DEFAULT_DATA_URL,
        max_rows = DEFAULT_MAX_ROWS,
        top_n = DEFAULT_TOP_N,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config_template_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.source.url, DEFAULT_DATA_URL);
        assert_eq!(config.source.max_rows, 3200);
        assert!(config.source.file.is_none());
        assert_eq!(config.source.columns, ColumnMapping::default());
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.dashboard.default_range(), CountRange::new(1, 50));
        assert_eq!(config.dashboard.top_n, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.dashboard.range_max, 200);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nfile = \"cases.csv\"\nmax_rows = 100").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.file, Some(PathBuf::from("cases.csv")));
        assert_eq!(config.source.max_rows, 100);
    }

    #[test]
    fn test_load_rejects_bad_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\ndefault_low = 60\ndefault_high = 50").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_rejects_zero_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmax_rows = 0").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SGCOVID_MAX_ROWS", "500"),
            ("SGCOVID_API_PORT", "9100"),
            ("SGCOVID_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_vars(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.source.max_rows, 500);
        assert_eq!(config.api.port, 9100);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_env_zero_rows_rejected() {
        let result = Config::from_vars(|key| {
            (key == "SGCOVID_MAX_ROWS").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_dashboard_allows() {
        let dash = DashboardConfig::default();
        assert!(dash.allows(CountRange::new(0, 200).unwrap()));
        assert!(!dash.allows(CountRange::new(0, 201).unwrap()));
    }

    #[test]
    fn test_file_source_preferred() {
        let source = SourceConfig {
            file: Some(PathBuf::from("/tmp/cases.csv")),
            ..Default::default()
        };
        let built = source.build_source().unwrap();
        assert_eq!(built.describe(), "/tmp/cases.csv");

        let remote = SourceConfig::default().build_source().unwrap();
        assert_eq!(remote.describe(), DEFAULT_DATA_URL);
    }
}

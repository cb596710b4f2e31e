//! Configuration loading for the admin console
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`CMS_*`)
//! 3. TOML config file (`--config`, else `<config dir>/cms-admin/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the console starts on defaults
//! and logs a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Directory name under the platform config and data dirs
pub const APP_DIR: &str = "cms-admin";

pub const ENV_API_BASE_URL: &str = "CMS_API_BASE_URL";
pub const ENV_PORT: &str = "CMS_PORT";
pub const ENV_BIND_ADDRESS: &str = "CMS_BIND_ADDRESS";
pub const ENV_DRAFTS_DATABASE: &str = "CMS_DRAFTS_DATABASE";
pub const ENV_SESSION_COOKIE: &str = "CMS_SESSION_COOKIE";
pub const ENV_AUTH_DISABLED: &str = "CMS_AUTH_DISABLED";
pub const ENV_API_TOKEN: &str = "CMS_API_TOKEN";

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the content API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite file holding local form drafts
    #[serde(default)]
    pub drafts_database: Option<PathBuf>,

    /// Name of the cookie carrying the backend session
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Skip the session check and act as a local admin (development only)
    #[serde(default)]
    pub auth_disabled: bool,

    /// Bearer token sent to the content API
    #[serde(default)]
    pub api_token: Option<String>,

    /// Timeout for each content API request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Rows per table page when the client does not ask
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            port: default_port(),
            bind_address: default_bind_address(),
            drafts_database: None,
            session_cookie: default_session_cookie(),
            auth_disabled: false,
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_port() -> u16 {
    5740
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_session_cookie() -> String {
    "session".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> i64 {
    crate::listing::DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values given on the command line; `None` defers to lower priorities
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub drafts_database: Option<PathBuf>,
    pub auth_disabled: bool,
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Default drafts database location for the platform
pub fn default_drafts_database() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("drafts.db"))
        .unwrap_or_else(|| PathBuf::from("./cms-admin-drafts.db"))
}

/// Parse a TOML config file
pub fn load_from_path(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Load the config file, falling back to defaults when it does not exist
///
/// A file that exists but cannot be parsed is an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let config = load_from_path(&path)?;
    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Apply `CMS_*` environment variables on top of `config`
pub fn apply_env(config: &mut TomlConfig) -> Result<()> {
    if let Some(url) = env_nonempty(ENV_API_BASE_URL) {
        config.api_base_url = url;
    }
    if let Some(port) = env_nonempty(ENV_PORT) {
        config.port = port
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a port: {}", ENV_PORT, port)))?;
    }
    if let Some(addr) = env_nonempty(ENV_BIND_ADDRESS) {
        config.bind_address = addr;
    }
    if let Some(path) = env_nonempty(ENV_DRAFTS_DATABASE) {
        config.drafts_database = Some(PathBuf::from(path));
    }
    if let Some(cookie) = env_nonempty(ENV_SESSION_COOKIE) {
        config.session_cookie = cookie;
    }
    if let Some(flag) = env_nonempty(ENV_AUTH_DISABLED) {
        config.auth_disabled = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
    if let Some(token) = env_nonempty(ENV_API_TOKEN) {
        config.api_token = Some(token);
    }
    Ok(())
}

/// Resolve the effective configuration: CLI > ENV > TOML > defaults
pub fn resolve(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<TomlConfig> {
    let mut config = load_or_default(config_path)?;
    apply_env(&mut config)?;

    if let Some(url) = overrides.api_base_url {
        config.api_base_url = url;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(addr) = overrides.bind_address {
        config.bind_address = addr;
    }
    if let Some(path) = overrides.drafts_database {
        config.drafts_database = Some(path);
    }
    if overrides.auth_disabled {
        config.auth_disabled = true;
    }

    config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
    if config.request_timeout_secs == 0 {
        return Err(Error::Config("request_timeout_secs must be positive".to_string()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 5740);
        assert_eq!(config.session_cookie, "session");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str("port = 9000\n[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.api_base_url, "http://localhost:1337");
    }
}

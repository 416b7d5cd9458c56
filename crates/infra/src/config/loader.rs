//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `POSSYNC_DB_USER`: Database user (primary and sites)
//! - `POSSYNC_DB_PASSWORD`: Database password
//! - `POSSYNC_DB_SERVER`: Primary database host
//! - `POSSYNC_DB_PORT`: Primary database port (default 1443)
//! - `POSSYNC_PRIMARY_DATABASE`: Database holding the directory and audit log
//! - `POSSYNC_SITE_DATABASE`: Database name on every site server
//! - `POSSYNC_DB_ENCRYPT`: Use TLS for database connections (default false)
//! - `POSSYNC_DB_TRUST_SERVER_CERTIFICATE`: Skip certificate checks (default
//!   true)
//! - `POSSYNC_DB_CONNECT_TIMEOUT_SECS`: Database connect timeout (default 30)
//! - `POSSYNC_HTTP_TIMEOUT_SECS`: Token and API call timeout (default 10)
//! - `POSSYNC_FORCE_IPV4`: Resolve HTTP hosts to IPv4 only (default true)
//! - `POSSYNC_HTTP_USER_AGENT`: Optional user agent
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./possync.json` or `./possync.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use possync_domain::constants::{DEFAULT_DB_PORT, DEFAULT_HTTP_TIMEOUT_SECS};
use possync_domain::{Config, DatabaseConfig, HttpConfig, PosSyncError, Result};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PosSyncError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PosSyncError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let database = DatabaseConfig {
        user: env_var("POSSYNC_DB_USER")?,
        password: env_var("POSSYNC_DB_PASSWORD")?,
        server: env_var("POSSYNC_DB_SERVER")?,
        port: env_parse("POSSYNC_DB_PORT", DEFAULT_DB_PORT)?,
        primary_database: env_var("POSSYNC_PRIMARY_DATABASE")?,
        site_database: env_var("POSSYNC_SITE_DATABASE")?,
        encrypt: env_bool("POSSYNC_DB_ENCRYPT", false),
        trust_server_certificate: env_bool("POSSYNC_DB_TRUST_SERVER_CERTIFICATE", true),
        connect_timeout_secs: env_parse(
            "POSSYNC_DB_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?,
    };

    let http = HttpConfig {
        timeout_secs: env_parse("POSSYNC_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        force_ipv4: env_bool("POSSYNC_FORCE_IPV4", true),
        user_agent: std::env::var("POSSYNC_HTTP_USER_AGENT").ok(),
    };

    Ok(Config { database, http })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PosSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PosSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PosSyncError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PosSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format is detected by file
/// extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PosSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PosSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PosSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "possync.json", "possync.toml"];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PosSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable, `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PosSyncError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

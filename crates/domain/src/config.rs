//! Configuration structures
//!
//! Deserialized from TOML/JSON files or assembled from environment variables
//! by the infrastructure loader.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DB_PORT, DEFAULT_HTTP_TIMEOUT_SECS};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Database credentials and targets.
///
/// The same credentials are used for the primary (directory) database and
/// for every site database; only host, port and database name differ.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    /// Host of the primary database
    pub server: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database holding the directory and audit tables
    pub primary_database: String,
    /// Database name used on every site server
    pub site_database: String,
    #[serde(default)]
    pub encrypt: bool,
    #[serde(default = "default_true")]
    pub trust_server_certificate: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("primary_database", &self.primary_database)
            .field("site_database", &self.site_database)
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Outbound HTTP settings shared by the token broker and the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub force_ipv4: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS, force_ipv4: true, user_agent: None }
    }
}

fn default_db_port() -> u16 {
    DEFAULT_DB_PORT
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let config = DatabaseConfig {
            user: "sync".into(),
            password: "hunter2".into(),
            server: "10.0.0.1".into(),
            port: 1443,
            primary_database: "control".into(),
            site_database: "pos".into(),
            encrypt: false,
            trust_server_certificate: true,
            connect_timeout_secs: 30,
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn http_defaults_match_dispatch_contract() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout_secs, 10);
        assert!(http.force_ipv4);
    }
}

//! # POS Sync Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - PostgreSQL connectors and stores for the primary and site databases
//! - HTTP client, OAuth token broker and tenant API dispatcher
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `possync-core`
//! - Contains all "impure" code (network and database I/O)

pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{HttpTenantDispatcher, OAuthTokenBroker};
pub use database::{PgPrimaryConnector, PgSiteConnector};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};

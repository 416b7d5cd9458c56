//! # POS Sync Domain
//!
//! Business domain types and models for the POS sales sync.
//!
//! This crate contains:
//! - Sales data types (site connections, tenants, payments, items)
//! - Run bookkeeping types (log entries, summaries, commit outcomes)
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other POS sync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

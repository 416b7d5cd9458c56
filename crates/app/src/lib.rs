//! # POS Sync App
//!
//! Binary layer: logging, `.env` loading, wiring and a single sync run.
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the infrastructure adapters into the `SyncService`

pub mod context;
pub mod utils;

pub use context::*;

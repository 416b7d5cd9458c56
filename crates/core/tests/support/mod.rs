//! Shared test helpers for `possync-core` integration tests.
//!
//! In-memory ports and fixtures so orchestrator scenarios can focus on
//! behaviour instead of wiring.

#![allow(dead_code)]

pub mod fixtures;
pub mod ports;

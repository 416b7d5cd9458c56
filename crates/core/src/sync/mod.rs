//! Sales sync: read site databases, post tenant payloads, mark uploads.

pub mod aggregate;
pub mod assembler;
pub mod commit;
pub mod dispatch;
pub mod ports;
pub mod reader;
pub mod run_log;
pub mod service;

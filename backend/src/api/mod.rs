//! HTTP API module.
//!
//! This module provides the HTTP trigger, its response types and the run log
//! stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::{log_error, log_info, log_success, log_warning, LogEntry, LogLevel};
pub use server::{router, start_server, AppState};
pub use types::*;

//! Wayfarer - a multi-profile browser shell.
//!
//! This crate wires the shell together:
//! - Configuration and CLI commands
//! - Profile prompt
//! - Headless runner
//! - System web-view runner (`webview` feature)

pub mod chrome;
pub mod commands;
pub mod config;
pub mod prompt;
pub mod runner;
#[cfg(feature = "webview")]
pub mod webview;

pub use config::ShellConfig;
pub use runner::{run_headless, sweep_stale_guest_storage, SessionSummary};

/// Shell version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

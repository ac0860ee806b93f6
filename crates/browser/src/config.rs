//! Shell configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use profiles::CleanupPolicy;
use serde::Deserialize;
use ui::{SearchEngine, ShellSettings};

/// Shell configuration.
///
/// Read from an optional JSON file; every field has a default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Application data directory; the platform default when unset.
    pub data_dir: Option<PathBuf>,
    /// Parent directory for guest storage; the system temp dir when unset.
    pub guest_dir: Option<PathBuf>,
    /// Home page URL.
    pub home_page: String,
    /// Search engine name.
    pub search_name: String,
    /// Search URL template with a `%s` placeholder.
    pub search_template: String,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
    /// Guest cleanup attempts.
    pub guest_cleanup_attempts: u32,
    /// Delay between guest cleanup attempts, in milliseconds.
    pub guest_retry_delay_ms: u64,
    /// Open a fresh tab when the last one closes.
    pub keep_one_tab: bool,
}

impl ShellConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse a configuration from JSON.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the guest directory.
    pub fn with_guest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.guest_dir = Some(dir.into());
        self
    }

    /// Set the home page.
    pub fn with_home_page(mut self, home_page: &str) -> Self {
        self.home_page = home_page.to_string();
        self
    }

    /// Set window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Resolve the data directory.
    pub fn data_root(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => profiles::default_root()
                .context("no per-user data directory on this platform; pass --data-dir"),
        }
    }

    /// Resolve the guest storage parent.
    pub fn guest_parent(&self) -> PathBuf {
        self.guest_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Guest cleanup retry policy.
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        CleanupPolicy::new(
            self.guest_cleanup_attempts,
            Duration::from_millis(self.guest_retry_delay_ms),
        )
    }

    /// Settings for the UI shell.
    pub fn settings(&self) -> ShellSettings {
        ShellSettings::new()
            .with_home_page(&self.home_page)
            .with_search_engine(SearchEngine::new(&self.search_name, &self.search_template))
            .with_keep_one_tab(self.keep_one_tab)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        let settings = ShellSettings::default();
        let policy = CleanupPolicy::default();
        Self {
            data_dir: None,
            guest_dir: None,
            home_page: settings.home_page,
            search_name: settings.search_engine.name,
            search_template: settings.search_engine.url_template,
            width: 1200,
            height: 800,
            guest_cleanup_attempts: policy.max_attempts,
            guest_retry_delay_ms: policy.retry_delay.as_millis() as u64,
            keep_one_tab: false,
        }
    }
}

//! Runtime settings.
//!
//! Settings come from an optional YAML file; every field has a default so
//! an empty file (or no file at all) yields a working configuration. CLI
//! flags are applied on top by [`Settings::apply_cli`].

use crate::cli::Cli;
use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_SITE_ROOT: &str = "https://cointelegraph.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:73.0) Gecko/20100101 Firefox/73.0";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Site root; listing hrefs are resolved against it.
    pub site_root: String,
    pub user_agent: String,
    /// Intermediate listing snapshot written by step1 and read by step2.
    pub source_file: PathBuf,
    /// Parent of the per-run `resources_*` directories.
    pub downloads_dir: PathBuf,
    pub log_file: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
    /// Write each article as soon as it is fetched (flushed), instead of
    /// one batch at the end of the run.
    pub stream_results: bool,
    pub wait: WaitPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_root: DEFAULT_SITE_ROOT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            source_file: PathBuf::from("source.html"),
            downloads_dir: PathBuf::from("downloads"),
            log_file: PathBuf::from("cointelegraph.log"),
            webdriver_url: "http://localhost:4444".to_string(),
            headless: false,
            stream_results: true,
            wait: WaitPolicy::default(),
        }
    }
}

/// How long the crawler polls for the page to catch up after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Grace period after the cookie dialog closes, before the first poll.
    pub initial_settle_ms: u64,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            poll_interval_ms: 250,
            initial_settle_ms: 500,
        }
    }
}

impl WaitPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }
}

impl Settings {
    /// Load settings from a YAML file.
    #[instrument(level = "debug")]
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| ScrapeError::Format(format!("invalid settings file: {e}")))
    }

    /// Resolve the effective settings for a CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_cli(cli);
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.webdriver_url {
            self.webdriver_url = url.clone();
        }
        if cli.headless {
            self.headless = true;
        }
        if let Some(dir) = &cli.downloads_dir {
            self.downloads_dir = dir.clone();
        }
        if let Some(file) = &cli.log_file {
            self.log_file = file.clone();
        }
        if let Some(file) = &cli.source_file {
            self.source_file = file.clone();
        }
    }
}

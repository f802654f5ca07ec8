use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use scrape_core::RetryableStatusSet;
use scrape_engine::{ExtractSettings, FetchSettings, RunSettings, ScraperSettings, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Run settings, read from an optional RON file and overridden by flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub verbose: bool,
    pub worker_count: usize,
    pub clean_text: bool,
    pub shard_count: usize,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    pub error_status_codes: RetryableStatusSet,
    pub skip_existing: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let run = RunSettings::default();
        Self {
            verbose: true,
            worker_count: run.worker_count,
            clean_text: true,
            shard_count: run.shard_count,
            output_dir: PathBuf::from("scraped"),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            error_status_codes: RetryableStatusSet::default(),
            skip_existing: false,
            log_file: None,
        }
    }
}

impl ScrapeConfig {
    /// Loads the file named by `--config` (if any), then applies the flags.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        ron::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(shards) = cli.shards {
            self.shard_count = shards;
        }
        if let Some(workers) = cli.workers {
            self.worker_count = workers;
        }
        if let Some(timeout) = cli.timeout {
            self.request_timeout_secs = timeout;
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = Some(log_file.clone());
        }
        if cli.no_clean {
            self.clean_text = false;
        }
        if cli.quiet {
            self.verbose = false;
        }
        if cli.skip_existing {
            self.skip_existing = true;
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.worker_count >= 1, "worker_count must be at least 1");
        ensure!(self.shard_count >= 1, "shard_count must be at least 1");
        ensure!(
            self.connect_timeout_secs >= 1,
            "connect_timeout_secs must be at least 1"
        );
        ensure!(
            self.request_timeout_secs >= 1,
            "request_timeout_secs must be at least 1"
        );
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            clean_text: self.clean_text,
            ..ExtractSettings::default()
        }
    }

    pub fn scraper_settings(&self) -> ScraperSettings {
        ScraperSettings {
            verbose: self.verbose,
            error_statuses: self.error_status_codes.clone(),
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            shard_count: self.shard_count,
            worker_count: self.worker_count,
            skip_existing: self.skip_existing,
        }
    }
}

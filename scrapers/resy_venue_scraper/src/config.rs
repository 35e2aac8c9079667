use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::{Result, ScrapeError};

pub const CHECKPOINT_FILE: &str = "scrape_state.json";

/// Half-open range `[start, end)` of listing indexes scanned by one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanWindow {
    pub start: usize,
    pub end: usize,
}

impl ScanWindow {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self {
            start: 5000,
            end: 10000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserSettings {
    pub headless: bool,
    pub listing_timeout_secs: u64,
    pub venue_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            listing_timeout_secs: 60,
            venue_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub output_dir: PathBuf,
    pub window: ScanWindow,
    pub browser: BrowserSettings,
    pub retry: RetrySettings,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RESY_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(start) = env_parse("RESY_SCAN_START") {
            config.window.start = start;
        }
        if let Some(end) = env_parse("RESY_SCAN_END") {
            config.window.end = end;
        }
        if let Some(secs) = env_parse("RESY_LISTING_TIMEOUT_SECS") {
            config.browser.listing_timeout_secs = secs;
        }
        if let Some(secs) = env_parse("RESY_VENUE_TIMEOUT_SECS") {
            config.browser.venue_timeout_secs = secs;
        }
        if let Some(headless) = env_parse("RESY_HEADLESS") {
            config.browser.headless = headless;
        }
        if let Some(attempts) = env_parse("RESY_MAX_ATTEMPTS") {
            config.retry.max_attempts = attempts;
        }
        if let Some(ms) = env_parse("RESY_RETRY_DELAY_MS") {
            config.retry.initial_delay_ms = ms;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.start > self.window.end {
            return Err(ScrapeError::Config(format!(
                "scan window start {} is past its end {}",
                self.window.start, self.window.end
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ScrapeError::Config("max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(CHECKPOINT_FILE)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.listing_timeout_secs)
    }

    pub fn venue_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.venue_timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            window: ScanWindow::default(),
            browser: BrowserSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

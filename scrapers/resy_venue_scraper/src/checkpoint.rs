use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

use crate::config::ScanWindow;
use crate::error::{Result, ScrapeError};

/// Durable scan position: the next listing index still to be handled, and the
/// window and listing it was measured against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanCheckpoint {
    pub next_index: usize,
    pub listing_size: usize,
    pub window_start: usize,
    pub window_end: usize,
    pub updated_at: DateTime<Utc>,
}

impl ScanCheckpoint {
    pub fn new(next_index: usize, listing_size: usize, window: &ScanWindow) -> Self {
        Self {
            next_index,
            listing_size,
            window_start: window.start,
            window_end: window.end,
            updated_at: Utc::now(),
        }
    }

    /// True when this checkpoint was taken over the same window of a listing
    /// of the same size.
    pub fn matches(&self, window: &ScanWindow, listing_size: usize) -> bool {
        self.window_start == window.start
            && self.window_end == window.end
            && self.listing_size == listing_size
    }

    /// `None` when no checkpoint has been written yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        let checkpoint = serde_json::from_str(&json).map_err(|source| ScrapeError::Checkpoint {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(checkpoint))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ScrapeError::Checkpoint {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Where a scan over `window` of a listing with `listing_size` venues picks
    /// up. A checkpoint taken over another window or listing is ignored.
    pub fn resume_index(
        checkpoint: Option<&Self>,
        window: &ScanWindow,
        listing_size: usize,
    ) -> usize {
        match checkpoint {
            Some(cp) if cp.matches(window, listing_size) => cp.next_index.max(window.start),
            Some(cp) => {
                warn!(
                    "Ignoring checkpoint for window {}..{} over {} venues; \
                     now scanning {}..{} over {} venues",
                    cp.window_start,
                    cp.window_end,
                    cp.listing_size,
                    window.start,
                    window.end,
                    listing_size
                );
                window.start
            }
            None => window.start,
        }
    }
}

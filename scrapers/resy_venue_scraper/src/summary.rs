use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Counters for a single scrape run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scanned: u64,
    pub written: u64,
    pub skipped: u64,
    pub missing_ids: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            scanned: 0,
            written: 0,
            skipped: 0,
            missing_ids: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

impl RunSummary {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn record_scanned(&mut self) {
        self.scanned += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_written(&mut self, venue_id_found: bool) {
        self.written += 1;
        if !venue_id_found {
            self.missing_ids += 1;
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn data_written(&self) -> bool {
        self.written > 0
    }

    pub fn log(&self) {
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_seconds())
            .unwrap_or(0);
        info!(
            "Scanned {} venues in {}s: {} written ({} without venue id), {} skipped",
            self.scanned, elapsed, self.written, self.missing_ids, self.skipped
        );
    }
}

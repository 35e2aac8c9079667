use std::fmt::Display;
use std::path::{Path, PathBuf};

use chromiumoxide::error::CdpError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Workbook error in {}: {message}", .path.display())]
    Workbook { path: PathBuf, message: String },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Checkpoint {} is unreadable: {source}", .path.display())]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No spreadsheet tables found in {}", .dir.display())]
    NoInput { dir: PathBuf },
}

impl ScrapeError {
    pub fn workbook(path: &Path, err: impl Display) -> Self {
        ScrapeError::Workbook {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Browser and navigation failures are worth another attempt; storage,
    /// configuration and input problems will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Launch(_) | ScrapeError::Browser(_) | ScrapeError::Navigation { .. }
        )
    }
}

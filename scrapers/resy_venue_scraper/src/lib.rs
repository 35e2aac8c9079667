pub mod browser;
pub mod checkpoint;
pub mod combine;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod listing;
pub mod orchestrator;
pub mod retry;
pub mod summary;
pub mod types;
pub mod utils;
pub mod workbook;

pub use error::{Result, ScrapeError};

use tracing_subscriber::EnvFilter;

/// Console logging for the binaries; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

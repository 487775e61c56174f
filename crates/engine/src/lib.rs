//! Library entrypoint for the revenue engine: page fetching, per-window
//! aggregation and the orchestrator that commits snapshots. The API process
//! embeds it; the binary in `main.rs` runs the refresh loop headless.

pub mod fetcher;
pub mod orchestrator;
pub mod pipeline;
pub mod scheduler;
pub mod snapshot;

use std::sync::Arc;

use revenue_pulse_domain::{
    config::{BootstrapConfig, ConfigError},
    services::telemetry::TelemetryError,
    storage::{CredentialStore, StorageError},
};
use thiserror::Error;

pub use fetcher::{decode_page, FetchError, HttpPageFetcher, PageFetcher, PAGE_LIMIT};
pub use orchestrator::{RefreshError, RevenueOrchestrator};
pub use pipeline::{aggregate_window, collect_window};
pub use scheduler::{refresh_once, run_refresh_loop};
pub use snapshot::SnapshotCell;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("http client error: {0}")]
    Http(String),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl From<reqwest::Error> for EngineError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

/// Wires the HTTP fetcher and the given credential store into an
/// orchestrator configured from `config`.
pub fn build_orchestrator(
    config: &BootstrapConfig,
    credentials: Arc<dyn CredentialStore>,
) -> Result<RevenueOrchestrator, EngineError> {
    let fetcher = HttpPageFetcher::new(config.processor_api_url(), config.processor_timeout())?;
    Ok(RevenueOrchestrator::new(
        Arc::new(fetcher),
        credentials,
        config.calendar(),
    ))
}

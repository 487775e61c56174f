//! Headless engine binary: refreshes revenue on a timer and logs each
//! committed snapshot.

use std::{io, sync::Arc};

use revenue_pulse_domain::config::BootstrapConfig;
use revenue_pulse_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use revenue_pulse_engine::{build_orchestrator, run_refresh_loop, EngineError};
use revenue_pulse_storage::open_credential_store;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[engine] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), EngineError> {
    let config = BootstrapConfig::load_from_env()?;
    let telemetry_config = TelemetryConfig::from_env("ENGINE");
    init_telemetry(&telemetry_config)?;
    let credentials = open_credential_store(&config).await?;
    let orchestrator = Arc::new(build_orchestrator(&config, credentials)?);
    run_refresh_loop(orchestrator, config.refresh_interval()).await;
    Ok(())
}

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use revenue_pulse_domain::config::{ApiConfig, BootstrapConfig, ConfigError};
use revenue_pulse_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use revenue_pulse_domain::storage::StorageError;
use revenue_pulse_engine::{build_orchestrator, run_refresh_loop, EngineError};
use revenue_pulse_storage::open_credential_store;
use thiserror::Error;
use tracing::info;

use crate::{
    handlers::{
        credential_status_handler, delete_credential_handler, metrics_handler, refresh_handler,
        revenue_handler, set_credential_handler,
    },
    state::AppState,
};

pub async fn run() -> Result<(), BootstrapError> {
    let api_config = ApiConfig::load_from_env()?;
    let config = BootstrapConfig::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("API");
    let telemetry = init_telemetry(&telemetry_config)?;

    let credentials = open_credential_store(&config).await?;
    let orchestrator = Arc::new(build_orchestrator(&config, credentials)?);

    // The timer shares the orchestrator with manual refreshes, so both go
    // through the same single-flight guard.
    tokio::spawn(run_refresh_loop(
        orchestrator.clone(),
        config.refresh_interval(),
    ));

    let state = AppState::new(orchestrator, telemetry, config.currency());
    info!(
        bind = api_config.api_bind_address(),
        refresh_interval_secs = config.refresh_interval().as_secs(),
        "starting revenue api"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(api_config.api_bind_address())?
    .run()
    .await?;

    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/revenue", web::get().to(revenue_handler))
        .route("/api/v1/revenue/refresh", web::post().to(refresh_handler))
        .service(
            web::resource("/api/v1/credential")
                .route(web::get().to(credential_status_handler))
                .route(web::put().to(set_credential_handler))
                .route(web::delete().to(delete_credential_handler)),
        )
        .route("/metrics", web::get().to(metrics_handler));
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

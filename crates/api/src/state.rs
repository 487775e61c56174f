use std::sync::Arc;

use revenue_pulse_domain::services::telemetry::TelemetryGuard;
use revenue_pulse_domain::storage::CredentialStore;
use revenue_pulse_engine::RevenueOrchestrator;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<RevenueOrchestrator>,
    telemetry: TelemetryGuard,
    currency: String,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<RevenueOrchestrator>,
        telemetry: TelemetryGuard,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            telemetry,
            currency: currency.into(),
        }
    }

    pub fn orchestrator(&self) -> &RevenueOrchestrator {
        self.orchestrator.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.orchestrator.credentials().as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }

    /// Display currency; amounts are never converted.
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

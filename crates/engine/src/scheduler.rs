use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::orchestrator::{RefreshError, RevenueOrchestrator};

/// Periodic trigger for [`RevenueOrchestrator::refresh`].
///
/// Refreshes immediately, then once per `period`. Failures are logged and the
/// next tick tries again; nothing is retried in between.
pub async fn run_refresh_loop(orchestrator: Arc<RevenueOrchestrator>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let _ = refresh_once(&orchestrator).await;
    }
}

/// One scheduled refresh with outcome logging.
pub async fn refresh_once(orchestrator: &RevenueOrchestrator) -> Result<(), RefreshError> {
    match orchestrator.refresh().await {
        Ok(snapshot) => {
            debug!(refreshed_at = ?snapshot.refreshed_at, "scheduled refresh committed");
            Ok(())
        }
        Err(RefreshError::MissingCredential) => {
            info!("no processor API key configured, skipping refresh");
            Err(RefreshError::MissingCredential)
        }
        Err(RefreshError::InProgress) => {
            debug!("previous refresh still running, skipping tick");
            Err(RefreshError::InProgress)
        }
        Err(err) if err.is_auth() => {
            warn!(error = %err, "processor rejected the API key, it needs to be re-entered");
            Err(err)
        }
        Err(err) => {
            warn!(error = %err, "scheduled refresh failed");
            Err(err)
        }
    }
}

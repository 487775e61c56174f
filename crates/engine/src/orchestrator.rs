use std::{sync::Arc, time::Instant};

use metrics::{counter, gauge, histogram};
use revenue_pulse_domain::model::{
    Clock, RefreshOutcome, RefreshStatus, ReportingCalendar, RevenueSnapshot, SystemClock,
};
use revenue_pulse_domain::storage::{CredentialStore, StorageError};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    fetcher::{FetchError, PageFetcher},
    pipeline::aggregate_window,
    snapshot::SnapshotCell,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no processor API key configured")]
    MissingCredential,
    #[error("a refresh is already in flight")]
    InProgress,
    #[error("credential store error: {0}")]
    Credential(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl RefreshError {
    /// True when the stored key was rejected and should be re-entered.
    pub fn is_auth(&self) -> bool {
        matches!(self, RefreshError::Fetch(FetchError::Auth(_)))
    }

    /// Status recorded for this failure. An overlapping call is not an
    /// outcome of its own; the refresh already running records one.
    pub fn status(&self) -> Option<RefreshStatus> {
        match self {
            RefreshError::MissingCredential => Some(RefreshStatus::MissingCredential),
            RefreshError::InProgress => None,
            RefreshError::Credential(_) => Some(RefreshStatus::CredentialStore),
            RefreshError::Fetch(FetchError::Auth(_)) => Some(RefreshStatus::Auth),
            RefreshError::Fetch(FetchError::Network(_)) => Some(RefreshStatus::Network),
            RefreshError::Fetch(FetchError::Decode(_)) => Some(RefreshStatus::Decode),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RefreshError::MissingCredential => "missing_credential",
            RefreshError::InProgress => "in_progress",
            RefreshError::Credential(_) => "credential_store",
            RefreshError::Fetch(FetchError::Auth(_)) => "auth",
            RefreshError::Fetch(FetchError::Network(_)) => "network",
            RefreshError::Fetch(FetchError::Decode(_)) => "decode",
        }
    }
}

/// Computes today / week / month-to-date totals and owns the committed
/// snapshot.
///
/// Has no timer of its own: a scheduler or a user action calls
/// [`RevenueOrchestrator::refresh`].
pub struct RevenueOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    calendar: ReportingCalendar,
    snapshot: SnapshotCell,
    in_flight: Mutex<()>,
}

impl RevenueOrchestrator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        credentials: Arc<dyn CredentialStore>,
        calendar: ReportingCalendar,
    ) -> Self {
        Self {
            fetcher,
            credentials,
            clock: Arc::new(SystemClock),
            calendar,
            snapshot: SnapshotCell::default(),
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Copy of the last committed snapshot.
    pub fn snapshot(&self) -> RevenueSnapshot {
        self.snapshot.current()
    }

    /// How the latest finished refresh ended, whoever triggered it.
    pub fn last_refresh(&self) -> Option<RefreshOutcome> {
        self.snapshot.last_outcome()
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Runs one refresh cycle.
    ///
    /// Only one refresh runs at a time; an overlapping call fails with
    /// [`RefreshError::InProgress`]. The snapshot is replaced only when all
    /// three windows succeed, otherwise the previous one stays in place.
    pub async fn refresh(&self) -> Result<RevenueSnapshot, RefreshError> {
        let result = self.run_refresh().await;
        let (label, status) = match &result {
            Ok(_) => ("committed", Some(RefreshStatus::Ok)),
            Err(err) => (err.label(), err.status()),
        };
        if let Some(status) = status {
            self.snapshot.record_outcome(RefreshOutcome {
                status,
                at: self.clock.now(),
            });
        }
        counter!("revenue_refresh_total", "result" => label).increment(1);
        result
    }

    async fn run_refresh(&self) -> Result<RevenueSnapshot, RefreshError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("refresh already in flight");
            return Err(RefreshError::InProgress);
        };

        let credential = self
            .credentials
            .get()
            .await?
            .filter(|key| !key.is_empty())
            .ok_or(RefreshError::MissingCredential)?;

        let now = self.clock.now();
        let windows = self.calendar.windows(now);
        let fetcher = self.fetcher.as_ref();
        let started = Instant::now();

        // The first failing branch resolves the join; the other two futures
        // are dropped, which cancels their in-flight requests.
        let joined = tokio::try_join!(
            aggregate_window(fetcher, &windows.today, &credential),
            aggregate_window(fetcher, &windows.week, &credential),
            aggregate_window(fetcher, &windows.month_to_date, &credential),
        );
        let (today, week, month_to_date) = match joined {
            Ok(totals) => totals,
            Err(err) => {
                warn!(error = %err, "refresh failed, keeping previous snapshot");
                return Err(err.into());
            }
        };
        histogram!("revenue_refresh_duration_seconds").record(started.elapsed().as_secs_f64());

        let snapshot = RevenueSnapshot {
            today_minor: today,
            week_minor: week,
            month_to_date_minor: month_to_date,
            refreshed_at: Some(now),
        };
        self.snapshot.replace(snapshot.clone());

        gauge!("revenue_window_total_minor", "window" => "today").set(today as f64);
        gauge!("revenue_window_total_minor", "window" => "week").set(week as f64);
        gauge!("revenue_window_total_minor", "window" => "month_to_date")
            .set(month_to_date as f64);
        info!(
            today_minor = today,
            week_minor = week,
            month_to_date_minor = month_to_date,
            "revenue snapshot committed"
        );
        Ok(snapshot)
    }
}

use std::sync::{PoisonError, RwLock};

use revenue_pulse_domain::model::{RefreshOutcome, RevenueSnapshot};

/// Holder of the committed [`RevenueSnapshot`] and of the outcome of the
/// latest refresh.
///
/// Readers always get a complete copy; the only writer is the orchestrator,
/// which replaces the whole value at once. A failed refresh updates the
/// outcome but never the snapshot.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    inner: RwLock<RevenueSnapshot>,
    last_outcome: RwLock<Option<RefreshOutcome>>,
}

impl SnapshotCell {
    pub fn current(&self) -> RevenueSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `None` until a refresh has finished.
    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        *self
            .last_outcome
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn replace(&self, snapshot: RevenueSnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub(crate) fn record_outcome(&self, outcome: RefreshOutcome) {
        *self
            .last_outcome
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }
}

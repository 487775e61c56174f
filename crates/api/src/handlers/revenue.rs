use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use revenue_pulse_domain::model::{RefreshOutcome, RevenueSnapshot};
use serde::{Deserialize, Serialize};

use crate::presentation::{format_major, menu_title};
use crate::state::AppState;

use super::{observe, ApiError, Endpoint};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevenueResponse {
    pub today_minor: u64,
    pub week_minor: u64,
    pub month_to_date_minor: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Latest refresh outcome, scheduled or manual; `None` before the first.
    pub last_refresh: Option<RefreshOutcome>,
    pub currency: String,
    pub display: RevenueDisplay,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevenueDisplay {
    pub today: String,
    pub week: String,
    pub month_to_date: String,
    pub title: String,
}

impl RevenueResponse {
    fn render(
        snapshot: RevenueSnapshot,
        last_refresh: Option<RefreshOutcome>,
        currency: &str,
    ) -> Self {
        let display = RevenueDisplay {
            today: format_major(snapshot.today_minor, 2, currency),
            week: format_major(snapshot.week_minor, 2, currency),
            month_to_date: format_major(snapshot.month_to_date_minor, 0, currency),
            title: menu_title(
                &snapshot,
                last_refresh.map(|outcome| outcome.status),
                currency,
            ),
        };
        Self {
            today_minor: snapshot.today_minor,
            week_minor: snapshot.week_minor,
            month_to_date_minor: snapshot.month_to_date_minor,
            refreshed_at: snapshot.refreshed_at,
            last_refresh,
            currency: currency.to_string(),
            display,
        }
    }
}

pub async fn revenue_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let orchestrator = state.orchestrator();
    let body = RevenueResponse::render(
        orchestrator.snapshot(),
        orchestrator.last_refresh(),
        state.currency(),
    );
    observe(Endpoint::Revenue, Ok(HttpResponse::Ok().json(body)))
}

/// Runs a refresh inline; the response carries the freshly committed totals.
pub async fn refresh_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let result = state
        .orchestrator()
        .refresh()
        .await
        .map(|snapshot| {
            let last_refresh = state.orchestrator().last_refresh();
            HttpResponse::Ok().json(RevenueResponse::render(
                snapshot,
                last_refresh,
                state.currency(),
            ))
        })
        .map_err(ApiError::from);
    observe(Endpoint::Refresh, result)
}

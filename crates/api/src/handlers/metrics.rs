use actix_web::{web::Data, HttpResponse};

use crate::state::AppState;

/// Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Serves the refresh and request counters recorded since boot. Scrapes are
/// not themselves counted.
pub async fn metrics_handler(state: Data<AppState>) -> HttpResponse {
    let exposition = state.telemetry().render_metrics();
    HttpResponse::Ok()
        .content_type(EXPOSITION_CONTENT_TYPE)
        .body(exposition)
}

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
use chrono::{TimeZone, Utc};
use revenue_pulse_domain::model::DateWindow;
use revenue_pulse_domain::storage::ApiKey;
use revenue_pulse_engine::{aggregate_window, FetchError, HttpPageFetcher, PageFetcher, PAGE_LIMIT};
use serde_json::json;

const GOOD_KEY: &str = "sk_test_integration";

#[derive(Default)]
struct Recorded {
    queries: Mutex<Vec<HashMap<String, String>>>,
}

async fn list_charges(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    recorded: web::Data<Recorded>,
) -> HttpResponse {
    recorded.queries.lock().unwrap().push(query.0.clone());

    let authorized = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {GOOD_KEY}"))
        .unwrap_or(false);
    if !authorized {
        return HttpResponse::Unauthorized().json(json!({
            "error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}
        }));
    }

    let charge = |id: &str, amount: u64, status: &str, refunded: bool| {
        json!({"id": id, "object": "charge", "amount": amount, "currency": "usd",
               "status": status, "refunded": refunded, "created": 1_715_760_000})
    };
    match query.get("starting_after").map(String::as_str) {
        None => HttpResponse::Ok().json(json!({
            "object": "list",
            "has_more": true,
            "data": [charge("ch_1", 1000, "succeeded", false), charge("ch_2", 400, "succeeded", true)]
        })),
        Some("ch_2") => HttpResponse::Ok().json(json!({
            "object": "list",
            "has_more": false,
            "data": [charge("ch_3", 250, "succeeded", false), charge("ch_4", 90, "failed", false)]
        })),
        Some(_) => HttpResponse::BadRequest().finish(),
    }
}

async fn stalled_listing() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(3)).await;
    HttpResponse::Ok().json(json!({"object": "list", "has_more": false, "data": []}))
}

async fn start_processor() -> (SocketAddr, ServerHandle, web::Data<Recorded>) {
    let recorded = web::Data::new(Recorded::default());
    let data = recorded.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/v1/charges", web::get().to(list_charges))
            .route("/stalled/v1/charges", web::get().to(stalled_listing))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind test processor");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (addr, handle, recorded)
}

fn window() -> DateWindow {
    DateWindow::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
    )
}

#[actix_web::test]
async fn paginates_against_listing_endpoint() {
    let (addr, handle, recorded) = start_processor().await;
    let fetcher = HttpPageFetcher::new(format!("http://{addr}/v1"), Duration::from_secs(5)).unwrap();

    let total = aggregate_window(&fetcher, &window(), &ApiKey::new(GOOD_KEY))
        .await
        .expect("window aggregates");
    assert_eq!(total, 1250);

    let queries = recorded.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 2);
    let first = &queries[0];
    assert_eq!(first["created[gte]"], window().start_epoch().to_string());
    assert_eq!(first["created[lte]"], window().end_epoch().to_string());
    assert_eq!(first["limit"], PAGE_LIMIT.to_string());
    assert!(!first.contains_key("starting_after"));
    assert_eq!(queries[1]["starting_after"], "ch_2");

    handle.stop(true).await;
}

#[actix_web::test]
async fn rejected_key_is_an_auth_failure() {
    let (addr, handle, _recorded) = start_processor().await;
    let fetcher = HttpPageFetcher::new(format!("http://{addr}/v1/"), Duration::from_secs(5)).unwrap();

    let err = fetcher
        .fetch_page(&window(), None, &ApiKey::new("sk_test_revoked"))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Auth("Invalid API Key provided".to_string()));

    handle.stop(true).await;
}

#[actix_web::test]
async fn unreachable_processor_is_a_network_failure() {
    let fetcher = HttpPageFetcher::new("http://127.0.0.1:9/v1", Duration::from_secs(2)).unwrap();

    let err = fetcher
        .fetch_page(&window(), None, &ApiKey::new(GOOD_KEY))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[actix_web::test]
async fn request_timeout_is_a_network_failure() {
    let (addr, handle, _recorded) = start_processor().await;
    let fetcher =
        HttpPageFetcher::new(format!("http://{addr}/stalled/v1"), Duration::from_millis(300))
            .unwrap();

    let started = std::time::Instant::now();
    let err = fetcher
        .fetch_page(&window(), None, &ApiKey::new(GOOD_KEY))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, FetchError::Network(message) if message.contains("timed out")),
        "unexpected error: {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(3));

    handle.stop(false).await;
}

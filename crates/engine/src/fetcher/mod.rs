use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use revenue_pulse_domain::model::{DateWindow, Page, Transaction};
use revenue_pulse_domain::storage::ApiKey;
use thiserror::Error;
use tracing::debug;

mod types;

pub use types::{ChargeEntry, ChargeListEnvelope, ErrorDetail, ErrorEnvelope};

/// Page size requested from the listing endpoint.
pub const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The processor rejected the credential; re-entering it is the only fix.
    #[error("processor rejected credential: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed processor response: {0}")]
    Decode(String),
}

impl FetchError {
    fn kind(&self) -> &'static str {
        match self {
            FetchError::Auth(_) => "auth",
            FetchError::Network(_) => "network",
            FetchError::Decode(_) => "decode",
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network(format!("request timed out: {err}"))
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Source of transaction pages for one window.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Lists charges created inside `window` (both ends inclusive), starting
    /// strictly after `cursor` when one is given.
    async fn fetch_page(
        &self,
        window: &DateWindow,
        cursor: Option<&str>,
        credential: &ApiKey,
    ) -> Result<Page, FetchError>;
}

/// [`PageFetcher`] backed by the processor's `GET /charges` endpoint.
pub struct HttpPageFetcher {
    http: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn charges_url(&self) -> String {
        format!("{}/charges", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        window: &DateWindow,
        cursor: Option<&str>,
        credential: &ApiKey,
    ) -> Result<Page, FetchError> {
        let mut query = vec![
            ("created[gte]", window.start_epoch().to_string()),
            ("created[lte]", window.end_epoch().to_string()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(after) = cursor {
            query.push(("starting_after", after.to_string()));
        }

        let result = async {
            let response = self
                .http
                .get(self.charges_url())
                .bearer_auth(credential.expose())
                .query(&query)
                .send()
                .await
                .map_err(FetchError::from_transport)?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(FetchError::from_transport)?;
            decode_page(status, &body)
        }
        .await;

        match &result {
            Ok(page) => {
                counter!("revenue_pages_fetched_total").increment(1);
                debug!(
                    window_start = window.start_epoch(),
                    items = page.items().len(),
                    has_more = page.has_more(),
                    "fetched charge page"
                );
            }
            Err(err) => {
                counter!("revenue_fetch_errors_total", "kind" => err.kind()).increment(1);
            }
        }
        result
    }
}

/// Classifies a raw processor response.
///
/// 401/403 become [`FetchError::Auth`]; every other non-success status is a
/// [`FetchError::Network`] failure; a 2xx body that does not match the list
/// envelope is a [`FetchError::Decode`].
pub fn decode_page(status: StatusCode, body: &[u8]) -> Result<Page, FetchError> {
    if !status.is_success() {
        let message = error_message(status, body);
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth(message),
            _ => FetchError::Network(format!("processor returned {}: {message}", status.as_u16())),
        });
    }

    let envelope: ChargeListEnvelope =
        serde_json::from_slice(body).map_err(|err| FetchError::Decode(err.to_string()))?;
    let items = envelope
        .data
        .into_iter()
        .map(Transaction::from)
        .collect::<Vec<_>>();
    Ok(Page::new(items, envelope.has_more))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message.or(envelope.error.kind))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

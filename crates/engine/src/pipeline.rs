//! Per-window aggregation: exhaust the pages of one window, then sum the
//! eligible charges.

use revenue_pulse_domain::model::{sum_eligible, DateWindow, Transaction};
use revenue_pulse_domain::storage::ApiKey;
use tracing::debug;

use crate::fetcher::{FetchError, PageFetcher};

/// Fetches every page of `window` in order and returns all charges seen.
///
/// Each request resumes after the last id of the previous page, so pages are
/// strictly sequential. There is no page cap; the loop ends on the first page
/// without more results (an empty page always counts as the last one).
pub async fn collect_window(
    fetcher: &dyn PageFetcher,
    window: &DateWindow,
    credential: &ApiKey,
) -> Result<Vec<Transaction>, FetchError> {
    let mut transactions = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = fetcher
            .fetch_page(window, cursor.as_deref(), credential)
            .await?;
        pages += 1;
        let has_more = page.has_more();
        cursor = page.next_cursor().map(str::to_owned);
        transactions.extend(page.into_items());
        if !has_more {
            break;
        }
    }

    debug!(
        window_start = window.start_epoch(),
        window_end = window.end_epoch(),
        pages,
        transactions = transactions.len(),
        "window exhausted"
    );
    Ok(transactions)
}

/// Total of eligible charges in `window`, in minor units. Fails as a whole if
/// any page fails.
pub async fn aggregate_window(
    fetcher: &dyn PageFetcher,
    window: &DateWindow,
    credential: &ApiKey,
) -> Result<u64, FetchError> {
    let transactions = collect_window(fetcher, window, credential).await?;
    Ok(sum_eligible(&transactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use revenue_pulse_domain::model::Page;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted pages and records the cursor of every request.
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: Mutex<VecDeque<Result<Page, FetchError>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<Page, FetchError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(
            &self,
            _window: &DateWindow,
            cursor: Option<&str>,
            _credential: &ApiKey,
        ) -> Result<Page, FetchError> {
            self.cursors.lock().unwrap().push(cursor.map(str::to_owned));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetcher called more often than scripted")
        }
    }

    fn tx(id: &str, status: &str, refunded: bool, amount: u64) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount_minor: amount,
            currency: "usd".to_string(),
            status: status.to_string(),
            refunded,
            created: 0,
        }
    }

    fn paid(id: &str, amount: u64) -> Transaction {
        tx(id, "succeeded", false, amount)
    }

    fn window() -> DateWindow {
        DateWindow::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
        )
    }

    fn key() -> ApiKey {
        ApiKey::new("sk_test_pipeline")
    }

    #[tokio::test]
    async fn follows_cursor_until_last_page() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(Page::new(vec![paid("a", 1), paid("b", 2)], true)),
            Ok(Page::new(vec![paid("c", 3)], false)),
        ]);

        let seen = collect_window(&fetcher, &window(), &key()).await.unwrap();

        let ids: Vec<&str> = seen.iter().map(|tx| tx.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(fetcher.cursors(), vec![None, Some("b".to_string())]);
    }

    #[tokio::test]
    async fn empty_page_stops_even_when_server_claims_more() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(Page::new(vec![paid("a", 10)], true)),
            Ok(Page::new(Vec::new(), true)),
        ]);

        let total = aggregate_window(&fetcher, &window(), &key()).await.unwrap();

        assert_eq!(total, 10);
        assert_eq!(fetcher.cursors().len(), 2);
    }

    #[tokio::test]
    async fn sums_only_eligible_charges_across_pages() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(Page::new(
                vec![
                    tx("a", "succeeded", false, 500),
                    tx("b", "succeeded", true, 300),
                ],
                true,
            )),
            Ok(Page::new(
                vec![
                    tx("c", "pending", false, 700),
                    tx("d", "failed", false, 200),
                ],
                false,
            )),
        ]);

        let total = aggregate_window(&fetcher, &window(), &key()).await.unwrap();
        assert_eq!(total, 500);
    }

    #[tokio::test]
    async fn page_failure_discards_the_whole_window() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(Page::new(vec![paid("a", 100)], true)),
            Err(FetchError::Network("connection reset".into())),
        ]);

        let err = aggregate_window(&fetcher, &window(), &key())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Network("connection reset".into()));
    }
}

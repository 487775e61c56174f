//! Data structures shared across the engine and API crates.

mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use window::*;

/// The only processor status counted as settled revenue.
pub const SUCCEEDED_STATUS: &str = "succeeded";

/// One charge decoded from the processor's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Opaque processor id, only ever used as a pagination cursor.
    pub id: String,
    /// Amount in the smallest currency unit (e.g. cents).
    pub amount_minor: u64,
    /// Informational; totals assume a single currency.
    pub currency: String,
    pub status: String,
    pub refunded: bool,
    /// Creation time in epoch seconds, informational.
    pub created: i64,
}

impl Transaction {
    /// A transaction counts towards revenue iff it settled and was not
    /// refunded. Pending, failed, disputed and refunded charges are excluded.
    pub fn is_eligible(&self) -> bool {
        self.status == SUCCEEDED_STATUS && !self.refunded
    }
}

/// Sums the minor-unit amounts of every eligible transaction.
pub fn sum_eligible<'a, I>(transactions: I) -> u64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|tx| tx.is_eligible())
        .fold(0u64, |acc, tx| acc.saturating_add(tx.amount_minor))
}

/// One page of the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    items: Vec<Transaction>,
    has_more: bool,
}

impl Page {
    /// An empty page never reports more results, whatever the server claimed,
    /// so pagination always terminates.
    pub fn new(items: Vec<Transaction>, server_has_more: bool) -> Self {
        let has_more = server_has_more && !items.is_empty();
        Self { items, has_more }
    }

    pub fn items(&self) -> &[Transaction] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Transaction> {
        self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor for the following request: the id of the last item.
    pub fn next_cursor(&self) -> Option<&str> {
        self.items.last().map(|tx| tx.id.as_str())
    }
}

/// Committed result of the last successful refresh.
///
/// Replaced wholesale; a failed refresh never touches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevenueSnapshot {
    pub today_minor: u64,
    pub week_minor: u64,
    pub month_to_date_minor: u64,
    /// `None` until the first refresh succeeds.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl RevenueSnapshot {
    pub fn is_known(&self) -> bool {
        self.refreshed_at.is_some()
    }
}

/// How the most recent refresh ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Ok,
    MissingCredential,
    /// The processor rejected the key; it has to be re-entered.
    Auth,
    Network,
    Decode,
    CredentialStore,
}

impl RefreshStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, RefreshStatus::Ok)
    }
}

/// Outcome of the latest finished refresh, kept next to the snapshot so a
/// failure stays visible while the previous totals are still served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub status: RefreshStatus,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, status: &str, refunded: bool, amount: u64) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount_minor: amount,
            currency: "usd".to_string(),
            status: status.to_string(),
            refunded,
            created: 1_700_000_000,
        }
    }

    #[test]
    fn only_settled_unrefunded_charges_count() {
        let mixed = [
            tx("a", "succeeded", false, 500),
            tx("b", "succeeded", true, 300),
            tx("c", "pending", false, 700),
            tx("d", "failed", false, 200),
        ];
        assert_eq!(sum_eligible(&mixed), 500);
    }

    #[test]
    fn status_match_is_exact() {
        let near_misses = [
            tx("a", "Succeeded", false, 100),
            tx("b", "succeeded ", false, 100),
            tx("c", "disputed", false, 100),
        ];
        assert_eq!(sum_eligible(&near_misses), 0);
    }

    #[test]
    fn sum_saturates_instead_of_wrapping() {
        let huge = [
            tx("a", "succeeded", false, u64::MAX),
            tx("b", "succeeded", false, 1),
        ];
        assert_eq!(sum_eligible(&huge), u64::MAX);
    }

    #[test]
    fn empty_page_never_has_more() {
        let page = Page::new(Vec::new(), true);
        assert!(!page.has_more());
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn cursor_is_last_item_id() {
        let page = Page::new(
            vec![
                tx("ch_1", "succeeded", false, 1),
                tx("ch_2", "failed", false, 1),
            ],
            true,
        );
        assert!(page.has_more());
        assert_eq!(page.next_cursor(), Some("ch_2"));
    }

    #[test]
    fn default_snapshot_is_unknown_and_zeroed() {
        let snapshot = RevenueSnapshot::default();
        assert!(!snapshot.is_known());
        assert_eq!(snapshot.today_minor, 0);
        assert_eq!(snapshot.week_minor, 0);
        assert_eq!(snapshot.month_to_date_minor, 0);
    }

    #[test]
    fn refresh_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RefreshStatus::MissingCredential).unwrap(),
            "\"missing_credential\""
        );
        assert!(RefreshStatus::Ok.is_ok());
        assert!(!RefreshStatus::Auth.is_ok());
    }
}

use revenue_pulse_domain::model::Transaction;
use serde::Deserialize;

/// Envelope returned by the processor's list endpoints.
#[derive(Debug, Deserialize)]
pub struct ChargeListEnvelope {
    pub data: Vec<ChargeEntry>,
    pub has_more: bool,
}

/// One charge as serialized by the processor; unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ChargeEntry {
    pub id: String,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub refunded: bool,
    pub created: i64,
}

impl From<ChargeEntry> for Transaction {
    fn from(entry: ChargeEntry) -> Self {
        Transaction {
            id: entry.id,
            amount_minor: entry.amount,
            currency: entry.currency,
            status: entry.status,
            refunded: entry.refunded,
            created: entry.created,
        }
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

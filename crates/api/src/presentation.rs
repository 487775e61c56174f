//! Minor-unit totals rendered for people. Amounts stay integers until this
//! point; rounding only ever happens here.

use revenue_pulse_domain::model::{RefreshStatus, RevenueSnapshot};

/// Title shown until the first refresh commits.
pub const LOADING_TITLE: &str = "Loading…";
/// Title while no processor key is stored.
pub const MISSING_KEY_TITLE: &str = "Set API Key";
/// Title after a refresh failed for any other reason.
pub const FAILED_TITLE: &str = "Network Error";

/// Formats `minor` (hundredths) as a major amount with `decimals` fraction
/// digits (0 or 2) and thousands separators. Zero decimals round half up.
pub fn format_major(minor: u64, decimals: u8, currency: &str) -> String {
    let amount = if decimals == 0 {
        let whole = minor / 100 + u64::from(minor % 100 >= 50);
        group_thousands(whole)
    } else {
        format!("{}.{:02}", group_thousands(minor / 100), minor % 100)
    };
    match currency_symbol(currency) {
        Some(symbol) => format!("{symbol}{amount}"),
        None => format!("{} {amount}", currency.to_ascii_uppercase()),
    }
}

/// Compact "today • MTD" line; both values keep their cents. The latest
/// refresh status wins over the totals when it failed.
pub fn menu_title(
    snapshot: &RevenueSnapshot,
    last_status: Option<RefreshStatus>,
    currency: &str,
) -> String {
    match last_status {
        Some(RefreshStatus::MissingCredential) => return MISSING_KEY_TITLE.to_string(),
        Some(status) if !status.is_ok() => return FAILED_TITLE.to_string(),
        _ => {}
    }
    if !snapshot.is_known() {
        return LOADING_TITLE.to_string();
    }
    format!(
        "{} • MTD {}",
        format_major(snapshot.today_minor, 2, currency),
        format_major(snapshot.month_to_date_minor, 2, currency)
    )
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_lowercase().as_str() {
        "usd" | "cad" | "aud" => Some("$"),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn two_decimals_keep_cents() {
        assert_eq!(format_major(0, 2, "usd"), "$0.00");
        assert_eq!(format_major(5, 2, "usd"), "$0.05");
        assert_eq!(format_major(123_456_789, 2, "usd"), "$1,234,567.89");
    }

    #[test]
    fn zero_decimals_round_half_up() {
        assert_eq!(format_major(123_449, 0, "usd"), "$1,234");
        assert_eq!(format_major(123_450, 0, "usd"), "$1,235");
        assert_eq!(format_major(99_999_999, 0, "usd"), "$1,000,000");
    }

    #[test]
    fn unknown_currency_uses_code() {
        assert_eq!(format_major(100_000, 2, "chf"), "CHF 1,000.00");
        assert_eq!(format_major(100_000, 2, "EUR"), "€1,000.00");
    }

    #[test]
    fn title_waits_for_first_refresh() {
        assert_eq!(
            menu_title(&RevenueSnapshot::default(), None, "usd"),
            LOADING_TITLE
        );

        let snapshot = RevenueSnapshot {
            today_minor: 12_345,
            week_minor: 50_000,
            month_to_date_minor: 1_234_567,
            refreshed_at: Some(Utc::now()),
        };
        assert_eq!(
            menu_title(&snapshot, Some(RefreshStatus::Ok), "usd"),
            "$123.45 • MTD $12,345.67"
        );
    }

    #[test]
    fn failed_refresh_replaces_title() {
        let snapshot = RevenueSnapshot {
            today_minor: 100,
            refreshed_at: Some(Utc::now()),
            ..RevenueSnapshot::default()
        };
        assert_eq!(
            menu_title(&snapshot, Some(RefreshStatus::MissingCredential), "usd"),
            MISSING_KEY_TITLE
        );
        for status in [
            RefreshStatus::Auth,
            RefreshStatus::Network,
            RefreshStatus::Decode,
            RefreshStatus::CredentialStore,
        ] {
            assert_eq!(menu_title(&snapshot, Some(status), "usd"), FAILED_TITLE);
        }
        assert_eq!(
            menu_title(&RevenueSnapshot::default(), Some(RefreshStatus::Network), "usd"),
            FAILED_TITLE
        );
    }
}

//! Persistence contracts implemented outside the domain crate.

mod memory;
mod traits;

use std::fmt;

pub use memory::InMemoryCredentialStore;
pub use traits::*;

/// Fixed identifier under which the single processor secret is stored.
pub const CREDENTIAL_KEY: &str = "revenue_pulse.processor_api_key";

/// Secret processor API key.
///
/// `Debug` and `Display` are redacted; the raw value is only reachable through
/// [`ApiKey::expose`], which the fetcher uses for the bearer header.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Validates user-supplied input; surrounding whitespace is dropped and a
    /// blank key is rejected.
    pub fn parse(value: &str) -> Result<Self, EmptyApiKey> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptyApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("api key must not be empty")]
pub struct EmptyApiKey;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_never_formats_the_secret() {
        let key = ApiKey::new("sk_live_secret");
        assert!(!format!("{key:?}").contains("sk_live_secret"));
        assert!(!format!("{key}").contains("sk_live_secret"));
        assert_eq!(key.expose(), "sk_live_secret");
    }

    #[test]
    fn parse_trims_and_rejects_blank_keys() {
        assert_eq!(ApiKey::parse("  sk_test_1 \n").unwrap().expose(), "sk_test_1");
        assert_eq!(ApiKey::parse("   "), Err(EmptyApiKey));
        assert!(ApiKey::new(" ").is_empty());
    }
}

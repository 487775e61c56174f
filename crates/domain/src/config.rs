//! Environment-driven configuration structures shared by all binaries.

use std::{env, time::Duration};

use chrono::{FixedOffset, Weekday};
use thiserror::Error;

use crate::model::{ReportingCalendar, ReportingZone};
use crate::storage::ApiKey;

/// Default listing endpoint root of the payment processor.
pub const DEFAULT_PROCESSOR_API_URL: &str = "https://api.stripe.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
const DEFAULT_CURRENCY: &str = "usd";

/// API-specific configuration so the HTTP surface does not leak into the
/// headless engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_bind_address: String,
}

impl ApiConfig {
    /// Loads only the environment variables required by the API binary.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
        })
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }
}

/// Key configuration derived from `.env`/process variables so the engine and
/// the API share a deterministic environment contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    database_url: Option<String>,
    seed_api_key: Option<ApiKey>,
    processor_api_url: String,
    processor_timeout: Duration,
    refresh_interval: Duration,
    calendar: ReportingCalendar,
    currency: String,
}

impl BootstrapConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// process variables. A database is only required when no API key is
    /// seeded through the environment.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let seed_api_key = get_optional_var("PROCESSOR_API_KEY").map(ApiKey::new);
        let database_url = match get_optional_var("DATABASE_URL") {
            Some(url) => Some(url),
            None if seed_api_key.is_some() => None,
            None => return Err(ConfigError::MissingVar { key: "DATABASE_URL" }),
        };

        let processor_timeout = Duration::from_secs(get_number_or(
            "PROCESSOR_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let refresh_interval = Duration::from_secs(get_number_or(
            "REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?);

        let week_start = match get_optional_var("REPORTING_WEEK_START") {
            Some(raw) => raw
                .parse::<Weekday>()
                .map_err(|_| ConfigError::InvalidWeekday { value: raw })?,
            None => Weekday::Sun,
        };
        let zone = match get_optional_var("REPORTING_UTC_OFFSET_MINUTES") {
            Some(raw) => ReportingZone::Fixed(parse_offset(&raw)?),
            None => ReportingZone::Local,
        };

        Ok(Self {
            database_url,
            seed_api_key,
            processor_api_url: get_optional_var("PROCESSOR_API_URL")
                .unwrap_or_else(|| DEFAULT_PROCESSOR_API_URL.to_string()),
            processor_timeout,
            refresh_interval,
            calendar: ReportingCalendar::new(zone, week_start),
            currency: get_optional_var("REPORTING_CURRENCY")
                .map(|value| value.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Key supplied through `PROCESSOR_API_KEY`, used instead of the
    /// persistent credential store when present.
    pub fn seed_api_key(&self) -> Option<&ApiKey> {
        self.seed_api_key.as_ref()
    }

    pub fn processor_api_url(&self) -> &str {
        &self.processor_api_url
    }

    pub fn processor_timeout(&self) -> Duration {
        self.processor_timeout
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn calendar(&self) -> ReportingCalendar {
        self.calendar
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn get_number_or(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match get_optional_var(key) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    raw.parse::<i32>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ConfigError::InvalidOffset {
            value: raw.to_string(),
        })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("REVENUE_PULSE_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid positive integer in `{key}`: `{value}`")]
    InvalidNumber { key: &'static str, value: String },
    #[error("invalid weekday in `REPORTING_WEEK_START`: `{value}`")]
    InvalidWeekday { value: String },
    #[error("invalid offset in `REPORTING_UTC_OFFSET_MINUTES`: `{value}`")]
    InvalidOffset { value: String },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

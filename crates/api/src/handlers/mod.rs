pub mod credential;
pub mod metrics;
pub mod revenue;

pub use credential::{credential_status_handler, delete_credential_handler, set_credential_handler};
pub use metrics::metrics_handler;
pub use revenue::{refresh_handler, revenue_handler};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ::metrics::counter;
use revenue_pulse_domain::storage::{EmptyApiKey, StorageError};
use revenue_pulse_engine::{FetchError, RefreshError};
use serde::Serialize;
use strum_macros::IntoStaticStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error("invalid api key: {0}")]
    InvalidKey(#[from] EmptyApiKey),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Refresh(RefreshError::MissingCredential) => StatusCode::PRECONDITION_REQUIRED,
            ApiError::Refresh(RefreshError::InProgress) => StatusCode::CONFLICT,
            ApiError::Refresh(RefreshError::Fetch(FetchError::Auth(_))) => StatusCode::UNAUTHORIZED,
            ApiError::Refresh(RefreshError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Refresh(RefreshError::Credential(_)) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Metric label for each route.
#[derive(Debug, Clone, Copy, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    Revenue,
    Refresh,
    CredentialStatus,
    CredentialSet,
    CredentialDelete,
}

/// Counts the request under its final status and hands the result back.
pub(crate) fn observe(
    endpoint: Endpoint,
    result: Result<HttpResponse, ApiError>,
) -> Result<HttpResponse, ApiError> {
    let status = match &result {
        Ok(response) => response.status(),
        Err(err) => err.status_code(),
    };
    let endpoint: &'static str = endpoint.into();
    counter!(
        "api_requests_total",
        "endpoint" => endpoint,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    result
}

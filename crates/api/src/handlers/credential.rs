use actix_web::{web, HttpResponse};
use revenue_pulse_domain::storage::ApiKey;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;

use super::{observe, ApiError, Endpoint};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialStatusResponse {
    pub configured: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetCredentialRequest {
    pub api_key: String,
}

/// Reports whether a key is stored without ever returning it.
pub async fn credential_status_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .credentials()
        .get()
        .await
        .map(|key| {
            HttpResponse::Ok().json(CredentialStatusResponse {
                configured: key.is_some_and(|key| !key.is_empty()),
            })
        })
        .map_err(ApiError::from);
    observe(Endpoint::CredentialStatus, result)
}

pub async fn set_credential_handler(
    state: web::Data<AppState>,
    payload: web::Json<SetCredentialRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = async {
        let key = ApiKey::parse(&payload.api_key)?;
        state.credentials().set(key).await?;
        info!("processor api key updated");
        Ok::<_, ApiError>(HttpResponse::NoContent().finish())
    }
    .await;
    observe(Endpoint::CredentialSet, result)
}

pub async fn delete_credential_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let result = async {
        state.credentials().delete().await?;
        info!("processor api key removed");
        Ok::<_, ApiError>(HttpResponse::NoContent().finish())
    }
    .await;
    observe(Endpoint::CredentialDelete, result)
}

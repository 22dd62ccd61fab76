// POST /api/registry and GET /api/registry/search?q=
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::error::ApiError;
use crate::models::registry::{RegisterServiceRequest, ServiceResponse};
use crate::net::ssrf;
use crate::state::AppState;

pub async fn register_service(
    State(state): State<AppState>,
    Json(payload): Json<RegisterServiceRequest>,
) -> Result<Json<ServiceResponse>, ApiError> {
    let url = reqwest::Url::parse(&payload.endpoint)
        .map_err(|_| ApiError::BadInput("endpoint must be a valid url".into()))?;
    if url.scheme() != "https" {
        return Err(ApiError::BadInput("endpoint must use https".into()));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ApiError::BadInput("endpoint must not be a private IP address".into()))?;
    if ssrf::is_private_host(host) {
        return Err(ApiError::BadInput("endpoint must not be a private IP address".into()));
    }

    let service = crossfin_store::registry::insert(
        &state.db,
        crossfin_store::registry::NewService {
            name: payload.name,
            description: payload.description,
            endpoint: payload.endpoint,
            category: payload.category,
            is_paid: payload.is_paid,
            metadata: payload.metadata,
        },
    )
    .await?;

    Ok(Json(service.into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

pub async fn search_services(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ServiceResponse>>, ApiError> {
    let services = crossfin_store::registry::search(&state.db, &params.q).await?;
    Ok(Json(services.into_iter().map(ServiceResponse::from).collect()))
}

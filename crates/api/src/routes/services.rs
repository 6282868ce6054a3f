//! Labor service catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::LaborServiceId;
use domain::LaborService;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LaborService> for ServiceResponse {
    fn from(s: &LaborService) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            description: s.description.clone(),
            price_cents: s.price.cents(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// POST /admin/services
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), ApiError> {
    let service = LaborService::new(req.name, req.description, req.price_cents)?;
    state.repos.services.save(&service).await?;
    Ok((StatusCode::CREATED, Json(ServiceResponse::from(&service))))
}

/// GET /admin/services
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, ApiError> {
    let services = state.repos.services.list().await?;
    Ok(Json(services.iter().map(ServiceResponse::from).collect()))
}

/// PUT /admin/services/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ServiceRequest>,
) -> Result<Json<ServiceResponse>, ApiError> {
    let service_id: LaborServiceId = parse_id(&id, "service")?;
    let mut service = state.repos.services.get_by_id(service_id).await?;
    service.update(req.name, req.description, req.price_cents)?;
    state.repos.services.save(&service).await?;
    Ok(Json(ServiceResponse::from(&service)))
}

/// DELETE /admin/services/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let service_id: LaborServiceId = parse_id(&id, "service")?;
    state.repos.services.delete(service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Vehicle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{ClientId, VehicleId};
use domain::Vehicle;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateVehicleRequest {
    pub client_id: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
}

#[derive(Deserialize)]
pub struct UpdateVehicleRequest {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListVehiclesQuery {
    pub client_id: Option<String>,
}

#[derive(Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub client_id: String,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Vehicle> for VehicleResponse {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.to_string(),
            client_id: v.client_id.to_string(),
            plate: v.plate.as_str().to_string(),
            brand: v.brand.clone(),
            model: v.model.clone(),
            year: v.year,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// POST /admin/vehicles: the owning client must exist.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), ApiError> {
    let client_id: ClientId = parse_id(&req.client_id, "client")?;
    let vehicle = Vehicle::new(client_id, &req.plate, req.brand, req.model, req.year)?;
    state.repos.clients.get_by_id(client_id).await?;

    state.repos.vehicles.save(&vehicle).await?;
    tracing::info!(vehicle_id = %vehicle.id, %client_id, "vehicle registered");
    Ok((StatusCode::CREATED, Json(VehicleResponse::from(&vehicle))))
}

/// GET /admin/vehicles?client_id=
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVehiclesQuery>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    let raw = query
        .client_id
        .ok_or_else(|| ApiError::BadRequest("client_id query parameter is required".to_string()))?;
    let client_id: ClientId = parse_id(&raw, "client")?;

    let vehicles = state.repos.vehicles.list_by_client(client_id).await?;
    Ok(Json(vehicles.iter().map(VehicleResponse::from).collect()))
}

/// PUT /admin/vehicles/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, ApiError> {
    let vehicle_id: VehicleId = parse_id(&id, "vehicle")?;
    let mut vehicle = state.repos.vehicles.get_by_id(vehicle_id).await?;
    vehicle.update(&req.plate, req.brand, req.model, req.year)?;
    state.repos.vehicles.save(&vehicle).await?;
    Ok(Json(VehicleResponse::from(&vehicle)))
}

/// DELETE /admin/vehicles/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let vehicle_id: VehicleId = parse_id(&id, "vehicle")?;
    state.repos.vehicles.delete(vehicle_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Parts inventory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::PartId;
use domain::Part;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct PartRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Deserialize)]
pub struct StockRequest {
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct PartResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Part> for PartResponse {
    fn from(part: &Part) -> Self {
        Self {
            id: part.id.to_string(),
            name: part.name.clone(),
            description: part.description.clone(),
            quantity: part.quantity(),
            unit_price_cents: part.unit_price.cents(),
            created_at: part.created_at,
            updated_at: part.updated_at,
        }
    }
}

/// POST /admin/parts
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PartRequest>,
) -> Result<(StatusCode, Json<PartResponse>), ApiError> {
    let part = Part::create(req.name, req.description, req.quantity, req.unit_price_cents)?;
    state.repos.parts.save(&part).await?;
    tracing::info!(part_id = %part.id, quantity = part.quantity(), "part created");
    Ok((StatusCode::CREATED, Json(PartResponse::from(&part))))
}

/// GET /admin/parts
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PartResponse>>, ApiError> {
    let parts = state.repos.parts.list().await?;
    Ok(Json(parts.iter().map(PartResponse::from).collect()))
}

/// PUT /admin/parts/{id}: replaces details, price and the stock count.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PartRequest>,
) -> Result<Json<PartResponse>, ApiError> {
    let part_id: PartId = parse_id(&id, "part")?;
    let mut part = state.repos.parts.get_by_id(part_id).await?;
    part.update_details(req.name, req.description, req.unit_price_cents)?;
    part.set_stock(req.quantity)?;

    state.repos.parts.update(&part).await?;
    Ok(Json(PartResponse::from(&part)))
}

/// POST /admin/parts/{id}/stock: restocks by a positive quantity.
#[tracing::instrument(skip(state, req))]
pub async fn add_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<StockRequest>,
) -> Result<Json<PartResponse>, ApiError> {
    let part_id: PartId = parse_id(&id, "part")?;
    let quantity = u32::try_from(req.quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid stock quantity: {} (must be positive)",
                req.quantity
            ))
        })?;

    let mut part = state.repos.parts.get_by_id(part_id).await?;
    part.add_stock(quantity)?;
    state.repos.parts.update(&part).await?;
    tracing::info!(%part_id, added = quantity, on_hand = part.quantity(), "part restocked");

    Ok(Json(PartResponse::from(&part)))
}

/// DELETE /admin/parts/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let part_id: PartId = parse_id(&id, "part")?;
    state.repos.parts.delete(part_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

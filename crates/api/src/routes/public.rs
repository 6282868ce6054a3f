//! Endpoints the shop's clients reach without logging in.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::Order;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct TrackingItem {
    pub name: String,
    pub quantity: u32,
    pub total_cents: u64,
}

#[derive(Serialize)]
pub struct TrackingResponse {
    pub id: String,
    pub status: String,
    pub total_cents: u64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<TrackingItem>,
}

impl From<&Order> for TrackingResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            status: order.status().to_string(),
            total_cents: order.total().cents(),
            created_at: order.created_at(),
            items: order
                .items()
                .iter()
                .map(|item| TrackingItem {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    total_cents: item.total.cents(),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct BudgetDecision {
    pub approved: bool,
}

#[derive(Serialize)]
pub struct BudgetDecisionResponse {
    /// `approved` or `rejected`.
    pub status: &'static str,
    pub order_id: String,
}

/// GET /orders/{id}/track
#[tracing::instrument(skip(state))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let order = state.orders.get_order(order_id).await?;
    Ok(Json(TrackingResponse::from(&order)))
}

/// POST /orders/{id}/budget-response: the client's answer to a sent budget.
#[tracing::instrument(skip(state, req))]
pub async fn budget_response(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<BudgetDecision>,
) -> Result<Json<BudgetDecisionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;

    let status = if req.approved {
        state.orders.approve_order(order_id).await?;
        "approved"
    } else {
        state.orders.reject_budget(order_id).await?;
        "rejected"
    };
    tracing::info!(%order_id, status, "budget answered by client");

    Ok(Json(BudgetDecisionResponse {
        status,
        order_id: order_id.to_string(),
    }))
}

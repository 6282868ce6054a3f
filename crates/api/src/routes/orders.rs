//! Service order endpoints: intake, lookup and the lifecycle transitions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{ClientId, OrderId, VehicleId};
use domain::{
    ItemType, NotificationOutcome, Order, OrderError, OrderItem, OrderLine, Role, TransitionResult,
};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::auth::AuthClaims;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub vehicle_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    /// `service` or `part`.
    #[serde(rename = "type")]
    pub item_type: String,
    pub ref_id: String,
    pub quantity: i64,
}

impl OrderItemRequest {
    fn to_line(&self) -> Result<OrderLine, ApiError> {
        let item_type: ItemType = self.item_type.parse()?;
        let ref_id = uuid::Uuid::parse_str(&self.ref_id)
            .map_err(|e| ApiError::BadRequest(format!("Invalid ref_id format: {e}")))?;
        let quantity = u32::try_from(self.quantity).map_err(|_| OrderError::InvalidQuantity {
            quantity: self.quantity,
        })?;
        Ok(OrderLine {
            item_type,
            ref_id,
            quantity,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// List every order, oldest first, instead of the active queue.
    #[serde(default)]
    pub all: bool,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub client_id: String,
    pub vehicle_id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_service_cents: u64,
    pub total_parts_cents: u64,
    pub total_cents: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub ref_id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
    pub total_cents: u64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id.to_string(),
            ref_id: item.ref_id.to_string(),
            item_type: item.item_type,
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            total_cents: item.total.cents(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            client_id: order.client_id().to_string(),
            vehicle_id: order.vehicle_id().to_string(),
            status: order.status().to_string(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total_service_cents: order.total_service().cents(),
            total_parts_cents: order.total_parts().cents(),
            total_cents: order.total().cents(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
            started_at: order.started_at(),
            finished_at: order.finished_at(),
        }
    }
}

/// Outcome of the client notification that follows a transition.
#[derive(Serialize)]
pub struct NotificationResponse {
    /// `sent`, `client_unavailable` or `failed`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&NotificationOutcome> for NotificationResponse {
    fn from(outcome: &NotificationOutcome) -> Self {
        let (status, reason) = match outcome {
            NotificationOutcome::Sent => ("sent", None),
            NotificationOutcome::ClientUnavailable { reason } => {
                ("client_unavailable", Some(reason.clone()))
            }
            NotificationOutcome::Failed { reason } => ("failed", Some(reason.clone())),
        };
        Self { status, reason }
    }
}

#[derive(Serialize)]
pub struct TransitionResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub notification: NotificationResponse,
}

impl From<TransitionResult> for TransitionResponse {
    fn from(result: TransitionResult) -> Self {
        Self {
            order: OrderResponse::from(&result.order),
            notification: NotificationResponse::from(&result.notification),
        }
    }
}

// -- Handlers --

/// POST /admin/orders: prices every line against the current catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let client_id: ClientId = parse_id(&req.client_id, "client")?;
    let vehicle_id: VehicleId = parse_id(&req.vehicle_id, "vehicle")?;
    let lines = req
        .items
        .iter()
        .map(OrderItemRequest::to_line)
        .collect::<Result<Vec<_>, _>>()?;

    let order = state
        .intake
        .open_order(client_id, vehicle_id, &lines)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /admin/orders: active orders by priority; `?all=true` lists every order.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = if query.all {
        state.orders.list_orders().await?
    } else {
        state.orders.list_active().await?
    };
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /admin/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let order = state.orders.get_order(order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PATCH /admin/orders/{id}/approve: reserves stock for every part line.
#[tracing::instrument(skip(state))]
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let result = state.orders.approve_order(order_id).await?;
    Ok(Json(result.into()))
}

/// POST /admin/orders/{id}/diagnosis/start
#[tracing::instrument(skip(state))]
pub async fn start_diagnosis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let result = state.orders.start_diagnosis(order_id).await?;
    Ok(Json(result.into()))
}

/// POST /admin/orders/{id}/budget/send
#[tracing::instrument(skip(state))]
pub async fn send_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let result = state.orders.send_budget(order_id).await?;
    Ok(Json(result.into()))
}

/// POST /admin/orders/{id}/finish
#[tracing::instrument(skip(state))]
pub async fn finish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let result = state.orders.finish_order(order_id).await?;
    Ok(Json(result.into()))
}

/// POST /admin/orders/{id}/deliver
#[tracing::instrument(skip(state))]
pub async fn deliver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order")?;
    let result = state.orders.deliver_order(order_id).await?;
    Ok(Json(result.into()))
}

/// PATCH /admin/orders/{id}/status: admin-only override that skips the
/// transition table.
#[tracing::instrument(skip(state, claims, req))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    claims.require(&[Role::Admin])?;
    let order_id: OrderId = parse_id(&id, "order")?;

    let result = state.orders.update_status(order_id, &req.status).await?;
    tracing::warn!(
        %order_id,
        status = %result.order.status(),
        user_id = %claims.0.sub,
        "order status overridden"
    );
    Ok(Json(result.into()))
}

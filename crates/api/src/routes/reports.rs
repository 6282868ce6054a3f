//! Management reports.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct RevenueResponse {
    pub period: &'static str,
    pub total_revenue_cents: u64,
    pub order_count: usize,
}

#[derive(Serialize)]
pub struct ExecutionTimeResponse {
    pub avg_execution_minutes: f64,
    pub orders_counted: usize,
}

/// GET /admin/reports/revenue
#[tracing::instrument(skip(state))]
pub async fn revenue(State(state): State<Arc<AppState>>) -> Result<Json<RevenueResponse>, ApiError> {
    let report = state.orders.revenue_report().await?;
    Ok(Json(RevenueResponse {
        period: report.period,
        total_revenue_cents: report.total_revenue.cents(),
        order_count: report.order_count,
    }))
}

/// GET /admin/reports/avg-execution-time
#[tracing::instrument(skip(state))]
pub async fn avg_execution_time(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExecutionTimeResponse>, ApiError> {
    let report = state.orders.execution_time_report().await?;
    Ok(Json(ExecutionTimeResponse {
        avg_execution_minutes: report.avg_execution_minutes,
        orders_counted: report.orders_counted,
    }))
}

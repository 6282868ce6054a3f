//! HTTP API server for the auto-repair shop.
//!
//! Provides public tracking and budget endpoints, JWT-protected `/admin`
//! endpoints for the shop staff, structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use domain::{
    ClientRepository, LaborServiceRepository, Notifier, OrderIntake, OrderRepository,
    OrderService, PartRepository, UserRepository, VehicleRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::StoreError;
use store::postgres::{self, PgPool};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use auth::TokenService;
use config::Config;

/// One repository per entity, all behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub parts: Arc<dyn PartRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub services: Arc<dyn LaborServiceRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            orders: Arc::new(store::InMemoryOrderRepository::new()),
            parts: Arc::new(store::InMemoryPartRepository::new()),
            clients: Arc::new(store::InMemoryClientRepository::new()),
            vehicles: Arc::new(store::InMemoryVehicleRepository::new()),
            services: Arc::new(store::InMemoryLaborServiceRepository::new()),
            users: Arc::new(store::InMemoryUserRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            orders: Arc::new(store::PostgresOrderRepository::new(pool.clone())),
            parts: Arc::new(store::PostgresPartRepository::new(pool.clone())),
            clients: Arc::new(store::PostgresClientRepository::new(pool.clone())),
            vehicles: Arc::new(store::PostgresVehicleRepository::new(pool.clone())),
            services: Arc::new(store::PostgresLaborServiceRepository::new(pool.clone())),
            users: Arc::new(store::PostgresUserRepository::new(pool)),
        }
    }

    /// PostgreSQL when `DATABASE_URL` is set (migrations applied), otherwise
    /// in-memory.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        match &config.database_url {
            Some(url) => {
                let pool = postgres::connect(url, config.db_max_connections).await?;
                postgres::run_migrations(&pool).await?;
                tracing::info!("connected to PostgreSQL, migrations applied");
                Ok(Self::postgres(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                Ok(Self::in_memory())
            }
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orders: OrderService,
    pub intake: OrderIntake,
    pub repos: Repositories,
    pub tokens: TokenService,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(repos: Repositories, notifier: Arc<dyn Notifier>, tokens: TokenService) -> Self {
        let orders = OrderService::new(
            repos.orders.clone(),
            repos.parts.clone(),
            repos.clients.clone(),
            notifier,
        );
        let intake = OrderIntake::new(
            repos.orders.clone(),
            repos.parts.clone(),
            repos.services.clone(),
        );
        Self {
            orders,
            intake,
            repos,
            tokens,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Requests running past `timeout` are answered with `408 Request Timeout`.
fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{auth as login, clients, health, orders, parts, public, reports, services, vehicles};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let admin = Router::new()
        .route("/clients", post(clients::create).get(clients::list))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/vehicles", post(vehicles::create).get(vehicles::list))
        .route(
            "/vehicles/{id}",
            put(vehicles::update).delete(vehicles::delete),
        )
        .route("/parts", post(parts::create).get(parts::list))
        .route("/parts/{id}", put(parts::update).delete(parts::delete))
        .route("/parts/{id}/stock", post(parts::add_stock))
        .route("/services", post(services::create).get(services::list))
        .route(
            "/services/{id}",
            put(services::update).delete(services::delete),
        )
        .route("/orders", post(orders::create).get(orders::list))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/approve", patch(orders::approve))
        .route("/orders/{id}/diagnosis/start", post(orders::start_diagnosis))
        .route("/orders/{id}/budget/send", post(orders::send_budget))
        .route("/orders/{id}/finish", post(orders::finish))
        .route("/orders/{id}/deliver", post(orders::deliver))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/reports/revenue", get(reports::revenue))
        .route("/reports/avg-execution-time", get(reports::avg_execution_time))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth::auth_middleware,
        ));

    let timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health::check))
        .route("/auth/register", post(login::register))
        .route("/auth/login", post(login::login))
        .route("/auth/refresh", post(login::refresh))
        .route("/orders/{id}/track", get(public::track))
        .route("/orders/{id}/budget-response", post(public::budget_response))
        .nest("/admin", admin)
        .with_state(state)
        .merge(metrics_router)
        .layer(request_timeout_layer(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "done"
                }),
            )
            .layer(request_timeout_layer(Duration::from_millis(10)));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}

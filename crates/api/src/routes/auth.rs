//! Staff registration, login and token refresh.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{RepositoryError, Role, User};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::TokenPair;
use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "invalid credentials";

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `employee`.
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

fn rejected_login(reason: &'static str) -> ApiError {
    metrics::counter!("auth_login_failures_total", "reason" => reason).increment(1);
    ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
}

// -- Handlers --

/// POST /auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let role = match req.role.as_deref().map(str::trim) {
        None | Some("") => Role::Employee,
        Some(role) => role.parse::<Role>()?,
    };

    let user = User::new(req.name, req.email, &req.password, role)?;
    state.repos.users.save(&user).await?;
    tracing::info!(user_id = %user.id, %role, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = match state.repos.users.get_by_email(&req.email).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound { .. }) => return Err(rejected_login("unknown_email")),
        Err(e) => return Err(e.into()),
    };

    if !user.check_password(&req.password) {
        tracing::warn!(user_id = %user.id, "wrong password");
        return Err(rejected_login("wrong_password"));
    }

    Ok(Json(state.tokens.issue_for(&user)?))
}

/// POST /auth/refresh: trades a refresh token for a new pair.
///
/// The new pair carries the user's current role.
#[tracing::instrument(skip(state, req))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let claims = state.tokens.verify_refresh(&req.refresh_token)?;
    let user = match state.repos.users.get_by_id(claims.user_id()?).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound { .. }) => {
            return Err(ApiError::Unauthorized("invalid refresh token".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(state.tokens.issue_for(&user)?))
}

//! Client CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{ClientId, DocumentKind};
use domain::Client;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ClientRequest {
    pub name: String,
    /// CPF or CNPJ, punctuation allowed.
    pub document: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub document: String,
    pub document_type: &'static str,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Client> for ClientResponse {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.to_string(),
            name: client.name.clone(),
            document: client.document.as_str().to_string(),
            document_type: match client.document.kind() {
                DocumentKind::Cpf => "cpf",
                DocumentKind::Cnpj => "cnpj",
            },
            email: client.email.clone(),
            phone: client.phone.clone(),
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

/// POST /admin/clients
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = Client::new(req.name, &req.document, req.email, req.phone)?;
    state.repos.clients.save(&client).await?;
    tracing::info!(client_id = %client.id, "client created");
    Ok((StatusCode::CREATED, Json(ClientResponse::from(&client))))
}

/// GET /admin/clients
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.repos.clients.list().await?;
    Ok(Json(clients.iter().map(ClientResponse::from).collect()))
}

/// GET /admin/clients/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client_id: ClientId = parse_id(&id, "client")?;
    let client = state.repos.clients.get_by_id(client_id).await?;
    Ok(Json(ClientResponse::from(&client)))
}

/// PUT /admin/clients/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client_id: ClientId = parse_id(&id, "client")?;
    let mut client = state.repos.clients.get_by_id(client_id).await?;
    client.update(req.name, &req.document, req.email, req.phone)?;
    state.repos.clients.save(&client).await?;
    Ok(Json(ClientResponse::from(&client)))
}

/// DELETE /admin/clients/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let client_id: ClientId = parse_id(&id, "client")?;
    state.repos.clients.delete(client_id).await?;
    tracing::info!(%client_id, "client deleted");
    Ok(StatusCode::NO_CONTENT)
}

//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{
    CatalogError, ClientError, DomainError, IdentityError, InventoryError, OrderError,
    RepositoryError, VehicleError,
};

use crate::auth::AuthError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Authenticated, but the role is not allowed.
    Forbidden(String),
    /// The request clashes with existing state.
    Conflict(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Persistence error outside the lifecycle service.
    Repository(RepositoryError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Repository(err) => repository_error_to_response(err),
            ApiError::Internal(msg) => internal(msg),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn internal(message: String) -> (StatusCode, String) {
    tracing::error!(error = %message, "internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Order(order_err) if order_err.is_invalid_argument() => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Inventory(inv_err) if inv_err.is_invalid_argument() => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Order(_) | DomainError::Inventory(_) => StatusCode::CONFLICT,
        DomainError::Repository(repo_err) => repository_status(repo_err),
    };
    with_status(status, err.to_string())
}

fn repository_error_to_response(err: RepositoryError) -> (StatusCode, String) {
    with_status(repository_status(&err), err.to_string())
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RepositoryError::Conflict { .. } | RepositoryError::Duplicate { .. } => {
            StatusCode::CONFLICT
        }
        RepositoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn with_status(status: StatusCode, message: String) -> (StatusCode, String) {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        internal(message)
    } else {
        (status, message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<VehicleError> for ApiError {
    fn from(err: VehicleError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Hashing(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => ApiError::Internal(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{OrderId, PartId};
    use domain::OrderStatus;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = DomainError::NotFound {
            entity: "order",
            id: OrderId::new().to_string(),
        };
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(RepositoryError::not_found("client", "x")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_invalid_argument_maps_to_400() {
        assert_eq!(
            status_of(OrderError::InvalidQuantity { quantity: 0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(OrderError::UnknownStatus("Lost".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(InventoryError::NameRequired),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ClientError::NameRequired), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let transition = OrderError::InvalidStateTransition {
            current: OrderStatus::Received,
            action: "finish",
            required: &[OrderStatus::InExecution],
        };
        assert_eq!(status_of(transition), StatusCode::CONFLICT);

        let stock = InventoryError::InsufficientStock {
            part_id: PartId::new(),
            requested: 3,
            available: 1,
        };
        assert_eq!(status_of(stock), StatusCode::CONFLICT);

        let stale: DomainError = RepositoryError::conflict("part", PartId::new()).into();
        assert_eq!(status_of(stale), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_maps_to_500() {
        let err = RepositoryError::storage("connection reset");
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        assert_eq!(
            status_of(AuthError::MissingCredentials),
            StatusCode::UNAUTHORIZED
        );
    }
}

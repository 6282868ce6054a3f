//! Domain error types.

use thiserror::Error;

use crate::inventory::InventoryError;
use crate::order::OrderError;
use crate::repository::RepositoryError;

/// Errors returned by the order lifecycle service.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An error occurred in the order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// A part rejected a stock change.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Persistence failed; includes stale version conflicts.
    #[error("Persistence error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for DomainError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            other => DomainError::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PartId;

    #[test]
    fn test_not_found_is_lifted() {
        let err: DomainError = RepositoryError::not_found("order", "42").into();
        assert!(matches!(err, DomainError::NotFound { entity: "order", .. }));
        assert_eq!(err.to_string(), "order not found: 42");
    }

    #[test]
    fn test_conflict_stays_a_repository_error() {
        let err: DomainError = RepositoryError::conflict("part", PartId::nil()).into();
        assert!(matches!(
            err,
            DomainError::Repository(RepositoryError::Conflict { .. })
        ));
    }
}

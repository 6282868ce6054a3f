//! Persistence ports.
//!
//! Each repository is an object-safe async trait so services can hold them
//! as `Arc<dyn _>` and tests can swap in the in-memory implementations.

use async_trait::async_trait;
use common::{ClientId, LaborServiceId, OrderId, PartId, UserId, VehicleId};
use thiserror::Error;

use crate::catalog::LaborService;
use crate::client::Client;
use crate::identity::User;
use crate::inventory::Part;
use crate::order::Order;
use crate::vehicle::Vehicle;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The row changed since it was read.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    /// A unique key is already taken.
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts or replaces the order header and its full item list.
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: OrderId) -> Result<Order, RepositoryError>;

    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Orders not yet Completed or Delivered, by status priority then age.
    async fn list_active(&self) -> Result<Vec<Order>, RepositoryError>;
}

#[async_trait]
pub trait PartRepository: Send + Sync {
    async fn save(&self, part: &Part) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: PartId) -> Result<Part, RepositoryError>;

    /// Writes the part if its version still matches, bumping the version.
    async fn update(&self, part: &Part) -> Result<(), RepositoryError>;

    /// Like [`PartRepository::update`] for several parts at once; either all
    /// rows are written or none.
    async fn update_all(&self, parts: &[Part]) -> Result<(), RepositoryError>;

    async fn delete(&self, id: PartId) -> Result<(), RepositoryError>;

    async fn list(&self) -> Result<Vec<Part>, RepositoryError>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn save(&self, client: &Client) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: ClientId) -> Result<Client, RepositoryError>;

    async fn list(&self) -> Result<Vec<Client>, RepositoryError>;

    async fn delete(&self, id: ClientId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn save(&self, vehicle: &Vehicle) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: VehicleId) -> Result<Vehicle, RepositoryError>;

    async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Vehicle>, RepositoryError>;

    async fn delete(&self, id: VehicleId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait LaborServiceRepository: Send + Sync {
    async fn save(&self, service: &LaborService) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: LaborServiceId) -> Result<LaborService, RepositoryError>;

    async fn list(&self) -> Result<Vec<LaborService>, RepositoryError>;

    async fn delete(&self, id: LaborServiceId) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts or replaces the user; a different user with the same email is
    /// a [`RepositoryError::Duplicate`].
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError>;
}

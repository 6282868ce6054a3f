//! Repository implementations for the auto-repair shop.
//!
//! - [`memory`]: `tokio::sync::RwLock` maps, used when no database is configured
//! - [`postgres`]: `sqlx` repositories over a shared `PgPool`

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::{
    InMemoryClientRepository, InMemoryLaborServiceRepository, InMemoryOrderRepository,
    InMemoryPartRepository, InMemoryUserRepository, InMemoryVehicleRepository,
};
pub use postgres::{
    PostgresClientRepository, PostgresLaborServiceRepository, PostgresOrderRepository,
    PostgresPartRepository, PostgresUserRepository, PostgresVehicleRepository,
};

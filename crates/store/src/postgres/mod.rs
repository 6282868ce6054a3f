//! PostgreSQL repositories.

mod clients;
mod orders;
mod parts;
mod services;
mod users;
mod vehicles;

pub use clients::PostgresClientRepository;
pub use orders::PostgresOrderRepository;
pub use parts::PostgresPartRepository;
pub use services::PostgresLaborServiceRepository;
pub use users::PostgresUserRepository;
pub use vehicles::PostgresVehicleRepository;

pub use sqlx::PgPool;

use domain::{Money, RepositoryError};
use sqlx::postgres::PgPoolOptions;

use crate::error::{Result, StoreError};

/// Opens a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Runs the database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

pub(crate) fn storage(e: impl Into<StoreError>) -> RepositoryError {
    RepositoryError::from(e.into())
}

pub(crate) fn money(table: &'static str, cents: i64) -> std::result::Result<Money, StoreError> {
    Money::try_from_cents(cents).map_err(|e| StoreError::corrupt(table, e))
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

//! Default data for a fresh installation.

use domain::{IdentityError, RepositoryError, Role, User, UserRepository};
use store::StoreError;
use thiserror::Error;

use crate::Repositories;
use crate::config::Config;

pub const ADMIN_NAME: &str = "Admin User";
pub const ADMIN_EMAIL: &str = "admin@autorepair.com";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("DATABASE_URL must be set to seed a persistent store")]
    MissingDatabase,
}

/// Seeds the PostgreSQL store named by `DATABASE_URL`.
///
/// Refuses to run without a database: an in-memory seed would be lost on exit.
pub async fn seed_database(config: &Config) -> Result<bool, SeedError> {
    if config.database_url.is_none() {
        return Err(SeedError::MissingDatabase);
    }
    let repos = Repositories::from_config(config).await?;
    ensure_admin(repos.users.as_ref()).await
}

/// Seeds the admin account when the server runs without a database, so a
/// fresh in-memory instance can still log in.
pub async fn seed_in_memory(config: &Config, repos: &Repositories) -> Result<bool, SeedError> {
    if config.database_url.is_some() {
        return Ok(false);
    }
    ensure_admin(repos.users.as_ref()).await
}

/// Creates the default admin account unless one already uses its email.
///
/// Returns `true` when the account was created.
pub async fn ensure_admin(users: &dyn UserRepository) -> Result<bool, SeedError> {
    match users.get_by_email(ADMIN_EMAIL).await {
        Ok(_) => {
            tracing::info!(email = ADMIN_EMAIL, "admin user already exists");
            return Ok(false);
        }
        Err(RepositoryError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let admin = User::new(ADMIN_NAME, ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin)?;
    users.save(&admin).await?;
    tracing::info!(user_id = %admin.id, email = ADMIN_EMAIL, "admin user created");
    Ok(true)
}

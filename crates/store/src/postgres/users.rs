use async_trait::async_trait;
use common::UserId;
use domain::{HashedPassword, RepositoryError, Role, User, UserRepository};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{is_unique_violation, storage};
use crate::error::{Result, StoreError};

const COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User> {
        let role: String = row.try_get("role")?;
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: HashedPassword::from_hash(row.try_get::<String, _>("password_hash")?),
            role: role
                .parse::<Role>()
                .map_err(|e| StoreError::corrupt("users", e))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> std::result::Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Duplicate {
                entity: "user",
                key: user.email.clone(),
            }),
            Err(e) => Err(storage(e)),
        }
    }

    async fn get_by_email(&self, email: &str) -> std::result::Result<User, RepositoryError> {
        let email = email.trim().to_lowercase();
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("user", &email))?;
        Self::row_to_user(&row).map_err(storage)
    }

    async fn get_by_id(&self, id: UserId) -> std::result::Result<User, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("user", id))?;
        Self::row_to_user(&row).map_err(storage)
    }
}

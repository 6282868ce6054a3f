use async_trait::async_trait;
use common::LaborServiceId;
use domain::{LaborService, LaborServiceRepository, RepositoryError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{money, storage};
use crate::error::Result;

const COLUMNS: &str = "id, name, description, price_cents, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresLaborServiceRepository {
    pool: PgPool,
}

impl PostgresLaborServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_service(row: &PgRow) -> Result<LaborService> {
        Ok(LaborService {
            id: LaborServiceId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: money("services", row.try_get("price_cents")?)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl LaborServiceRepository for PostgresLaborServiceRepository {
    async fn save(&self, service: &LaborService) -> std::result::Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO services (id, name, description, price_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price_cents = EXCLUDED.price_cents,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(service.id.as_uuid())
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price.cents_i64())
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn get_by_id(
        &self,
        id: LaborServiceId,
    ) -> std::result::Result<LaborService, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("service", id))?;
        Self::row_to_service(&row).map_err(storage)
    }

    async fn list(&self) -> std::result::Result<Vec<LaborService>, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM services ORDER BY name");
        sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
            .iter()
            .map(|row| Self::row_to_service(row).map_err(storage))
            .collect()
    }

    async fn delete(&self, id: LaborServiceId) -> std::result::Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("service", id));
        }
        Ok(())
    }
}

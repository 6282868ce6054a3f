use async_trait::async_trait;
use common::PartId;
use domain::{Part, PartRepository, RepositoryError};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::{money, storage};
use crate::error::{Result, StoreError};

const COLUMNS: &str =
    "id, name, description, stock_qty, unit_price_cents, version, created_at, updated_at";

/// PostgreSQL-backed part repository.
///
/// Updates are guarded by the `version` column: a write only lands if the
/// row still carries the version the part was read at.
#[derive(Clone)]
pub struct PostgresPartRepository {
    pool: PgPool,
}

enum WriteOutcome {
    Written,
    Missing,
    Stale,
}

impl PostgresPartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_part(row: &PgRow) -> Result<Part> {
        let quantity: i64 = row.try_get("stock_qty")?;
        Ok(Part::restore(
            PartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get("name")?,
            row.try_get("description")?,
            u32::try_from(quantity).map_err(|e| StoreError::corrupt("parts", e))?,
            money("parts", row.try_get("unit_price_cents")?)?,
            row.try_get("version")?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        ))
    }

    async fn write(conn: &mut PgConnection, part: &Part) -> Result<WriteOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE parts
            SET name = $2, description = $3, stock_qty = $4, unit_price_cents = $5,
                updated_at = $6, version = version + 1
            WHERE id = $1 AND version = $7
            "#,
        )
        .bind(part.id.as_uuid())
        .bind(&part.name)
        .bind(&part.description)
        .bind(i64::from(part.quantity()))
        .bind(part.unit_price.cents_i64())
        .bind(part.updated_at)
        .bind(part.version())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Written);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parts WHERE id = $1)")
            .bind(part.id.as_uuid())
            .fetch_one(&mut *conn)
            .await?;
        Ok(if exists {
            WriteOutcome::Stale
        } else {
            WriteOutcome::Missing
        })
    }

    fn outcome(part: &Part, outcome: WriteOutcome) -> std::result::Result<(), RepositoryError> {
        match outcome {
            WriteOutcome::Written => Ok(()),
            WriteOutcome::Missing => Err(RepositoryError::not_found("part", part.id)),
            WriteOutcome::Stale => {
                tracing::debug!(part_id = %part.id, version = part.version(), "stale part write rejected");
                Err(RepositoryError::conflict("part", part.id))
            }
        }
    }
}

#[async_trait]
impl PartRepository for PostgresPartRepository {
    async fn save(&self, part: &Part) -> std::result::Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO parts (id, name, description, stock_qty, unit_price_cents, version,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                stock_qty = EXCLUDED.stock_qty,
                unit_price_cents = EXCLUDED.unit_price_cents,
                version = EXCLUDED.version,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(part.id.as_uuid())
        .bind(&part.name)
        .bind(&part.description)
        .bind(i64::from(part.quantity()))
        .bind(part.unit_price.cents_i64())
        .bind(part.version())
        .bind(part.created_at)
        .bind(part.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn get_by_id(&self, id: PartId) -> std::result::Result<Part, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM parts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("part", id))?;
        Self::row_to_part(&row).map_err(storage)
    }

    async fn update(&self, part: &Part) -> std::result::Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(storage)?;
        let outcome = Self::write(&mut conn, part).await.map_err(storage)?;
        Self::outcome(part, outcome)
    }

    async fn update_all(&self, parts: &[Part]) -> std::result::Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        for part in parts {
            let outcome = Self::write(&mut tx, part).await.map_err(storage)?;
            // dropping the transaction rolls back the rows already written
            Self::outcome(part, outcome)?;
        }
        tx.commit().await.map_err(storage)
    }

    async fn delete(&self, id: PartId) -> std::result::Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("part", id));
        }
        Ok(())
    }

    async fn list(&self) -> std::result::Result<Vec<Part>, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM parts ORDER BY name");
        sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
            .iter()
            .map(|row| Self::row_to_part(row).map_err(storage))
            .collect()
    }
}

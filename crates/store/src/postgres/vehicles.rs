use async_trait::async_trait;
use common::{ClientId, Plate, VehicleId};
use domain::{RepositoryError, Vehicle, VehicleRepository};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::storage;
use crate::error::{Result, StoreError};

const COLUMNS: &str = "id, client_id, plate, brand, model, year, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresVehicleRepository {
    pool: PgPool,
}

impl PostgresVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_vehicle(row: &PgRow) -> Result<Vehicle> {
        let plate: String = row.try_get("plate")?;
        Ok(Vehicle {
            id: VehicleId::from_uuid(row.try_get::<Uuid, _>("id")?),
            client_id: ClientId::from_uuid(row.try_get::<Uuid, _>("client_id")?),
            plate: Plate::parse(&plate).map_err(|e| StoreError::corrupt("vehicles", e))?,
            brand: row.try_get("brand")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl VehicleRepository for PostgresVehicleRepository {
    async fn save(&self, vehicle: &Vehicle) -> std::result::Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, client_id, plate, brand, model, year, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                plate = EXCLUDED.plate,
                brand = EXCLUDED.brand,
                model = EXCLUDED.model,
                year = EXCLUDED.year,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(vehicle.id.as_uuid())
        .bind(vehicle.client_id.as_uuid())
        .bind(vehicle.plate.as_str())
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn get_by_id(&self, id: VehicleId) -> std::result::Result<Vehicle, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("vehicle", id))?;
        Self::row_to_vehicle(&row).map_err(storage)
    }

    async fn list_by_client(
        &self,
        client_id: ClientId,
    ) -> std::result::Result<Vec<Vehicle>, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE client_id = $1 ORDER BY created_at");
        sqlx::query(&query)
            .bind(client_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
            .iter()
            .map(|row| Self::row_to_vehicle(row).map_err(storage))
            .collect()
    }

    async fn delete(&self, id: VehicleId) -> std::result::Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("vehicle", id));
        }
        Ok(())
    }
}

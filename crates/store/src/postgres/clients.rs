use async_trait::async_trait;
use common::{ClientId, Document};
use domain::{Client, ClientRepository, RepositoryError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::storage;
use crate::error::{Result, StoreError};

const COLUMNS: &str = "id, name, document, email, phone, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: &PgRow) -> Result<Client> {
        let document: String = row.try_get("document")?;
        Ok(Client {
            id: ClientId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            document: Document::parse(&document).map_err(|e| StoreError::corrupt("clients", e))?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn save(&self, client: &Client) -> std::result::Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, document, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                document = EXCLUDED.document,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(client.document.as_str())
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    async fn get_by_id(&self, id: ClientId) -> std::result::Result<Client, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("client", id))?;
        Self::row_to_client(&row).map_err(storage)
    }

    async fn list(&self) -> std::result::Result<Vec<Client>, RepositoryError> {
        let query = format!("SELECT {COLUMNS} FROM clients ORDER BY created_at");
        sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
            .iter()
            .map(|row| Self::row_to_client(row).map_err(storage))
            .collect()
    }

    async fn delete(&self, id: ClientId) -> std::result::Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("client", id));
        }
        Ok(())
    }
}

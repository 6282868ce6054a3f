use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ClientId, OrderId, OrderItemId, VehicleId};
use domain::{
    ItemType, Order, OrderHeader, OrderItem, OrderRepository, OrderStatus, RepositoryError,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{money, storage};
use crate::error::{Result, StoreError};

const HEADER_COLUMNS: &str = "id, client_id, vehicle_id, status, created_at, updated_at, \
                              started_at, finished_at";

const ITEM_COLUMNS: &str =
    "id, order_id, ref_id, item_type, name, quantity, unit_price_cents, total_cents";

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_header(row: &PgRow) -> Result<OrderHeader> {
        let status: String = row.try_get("status")?;
        Ok(OrderHeader {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            client_id: ClientId::from_uuid(row.try_get::<Uuid, _>("client_id")?),
            vehicle_id: VehicleId::from_uuid(row.try_get::<Uuid, _>("vehicle_id")?),
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| StoreError::corrupt("orders", e))?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            started_at: row.try_get::<Option<DateTime<Utc>>, _>("started_at")?,
            finished_at: row.try_get::<Option<DateTime<Utc>>, _>("finished_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        let item_type: String = row.try_get("item_type")?;
        let quantity: i64 = row.try_get("quantity")?;
        Ok(OrderItem {
            id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            ref_id: row.try_get("ref_id")?,
            item_type: item_type
                .parse::<ItemType>()
                .map_err(|e| StoreError::corrupt("order_items", e))?,
            name: row.try_get("name")?,
            quantity: u32::try_from(quantity)
                .map_err(|e| StoreError::corrupt("order_items", e))?,
            unit_price: money("order_items", row.try_get("unit_price_cents")?)?,
            total: money("order_items", row.try_get("total_cents")?)?,
        })
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        let header = order.header();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, client_id, vehicle_id, status, total_service_cents,
                                total_parts_cents, total_cents, created_at, updated_at,
                                started_at, finished_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                total_service_cents = EXCLUDED.total_service_cents,
                total_parts_cents = EXCLUDED.total_parts_cents,
                total_cents = EXCLUDED.total_cents,
                updated_at = EXCLUDED.updated_at,
                started_at = EXCLUDED.started_at,
                finished_at = EXCLUDED.finished_at
            "#,
        )
        .bind(header.id.as_uuid())
        .bind(header.client_id.as_uuid())
        .bind(header.vehicle_id.as_uuid())
        .bind(header.status.as_str())
        .bind(order.total_service().cents_i64())
        .bind(order.total_parts().cents_i64())
        .bind(order.total().cents_i64())
        .bind(header.created_at)
        .bind(header.updated_at)
        .bind(header.started_at)
        .bind(header.finished_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(header.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, position, ref_id, item_type, name,
                                         quantity, unit_price_cents, total_cents)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(item.ref_id)
            .bind(item.item_type.as_str())
            .bind(&item.name)
            .bind(i64::from(item.quantity))
            .bind(item.unit_price.cents_i64())
            .bind(item.total.cents_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>> {
        let query = format!("SELECT {HEADER_COLUMNS} FROM orders WHERE id = $1");
        let Some(row) = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let header = Self::row_to_header(&row)?;

        let query =
            format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position");
        let items = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Order::restore(header, items)))
    }

    /// Loads headers with the given filter/order clause, then their items in
    /// one round trip.
    async fn fetch_orders(&self, clause: &str) -> Result<Vec<Order>> {
        let query = format!("SELECT {HEADER_COLUMNS} FROM orders {clause}");
        let headers = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(Self::row_to_header)
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id.as_uuid()).collect();
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) \
             ORDER BY order_id, position"
        );
        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in sqlx::query(&query).bind(&ids).fetch_all(&self.pool).await? {
            let item = Self::row_to_item(&row)?;
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let items = items_by_order.remove(&header.id).unwrap_or_default();
                Order::restore(header, items)
            })
            .collect())
    }
}

/// `CASE` expression ranking active statuses the same way
/// [`OrderStatus::active_priority`] does.
fn active_priority_case() -> String {
    let arms: String = OrderStatus::ALL
        .iter()
        .filter_map(|status| {
            status
                .active_priority()
                .map(|priority| format!(" WHEN '{}' THEN {priority}", status.as_str()))
        })
        .collect();
    format!("CASE status{arms} END")
}

fn active_status_list() -> String {
    OrderStatus::ALL
        .iter()
        .filter(|status| status.is_active())
        .map(|status| format!("'{}'", status.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> std::result::Result<(), RepositoryError> {
        self.save_order(order).await.map_err(storage)
    }

    async fn get_by_id(&self, id: OrderId) -> std::result::Result<Order, RepositoryError> {
        self.fetch_order(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::not_found("order", id))
    }

    async fn list(&self) -> std::result::Result<Vec<Order>, RepositoryError> {
        self.fetch_orders("ORDER BY created_at ASC")
            .await
            .map_err(storage)
    }

    async fn list_active(&self) -> std::result::Result<Vec<Order>, RepositoryError> {
        let clause = format!(
            "WHERE status IN ({}) ORDER BY {} ASC, created_at ASC",
            active_status_list(),
            active_priority_case()
        );
        self.fetch_orders(&clause).await.map_err(storage)
    }
}

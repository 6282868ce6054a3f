//! Opening new orders from catalog references.

use std::sync::Arc;

use common::{ClientId, LaborServiceId, PartId, VehicleId};
use uuid::Uuid;

use crate::error::DomainError;
use crate::repository::{LaborServiceRepository, OrderRepository, PartRepository, RepositoryError};

use super::{ItemType, Money, Order, OrderError};

/// A requested order line, before it is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub item_type: ItemType,
    pub ref_id: Uuid,
    pub quantity: u32,
}

/// Prices requested lines against the current catalog and stores the order.
pub struct OrderIntake {
    orders: Arc<dyn OrderRepository>,
    parts: Arc<dyn PartRepository>,
    services: Arc<dyn LaborServiceRepository>,
}

impl OrderIntake {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        parts: Arc<dyn PartRepository>,
        services: Arc<dyn LaborServiceRepository>,
    ) -> Self {
        Self {
            orders,
            parts,
            services,
        }
    }

    /// Creates an order in `Received` with one snapshot line per request.
    ///
    /// Any unknown reference or zero quantity rejects the whole order before
    /// anything is written.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn open_order(
        &self,
        client_id: ClientId,
        vehicle_id: VehicleId,
        lines: &[OrderLine],
    ) -> Result<Order, DomainError> {
        let mut order = Order::new(client_id, vehicle_id)?;

        for line in lines {
            let (name, unit_price) = self.resolve(line).await?;
            order.add_item(line.ref_id, line.item_type, name, line.quantity, unit_price)?;
        }

        self.orders.save(&order).await?;
        tracing::info!(order_id = %order.id(), total = %order.total(), "order opened");
        Ok(order)
    }

    async fn resolve(&self, line: &OrderLine) -> Result<(String, Money), DomainError> {
        let found = match line.item_type {
            ItemType::Service => self
                .services
                .get_by_id(LaborServiceId::from_uuid(line.ref_id))
                .await
                .map(|s| (s.name, s.price)),
            ItemType::Part => self
                .parts
                .get_by_id(PartId::from_uuid(line.ref_id))
                .await
                .map(|p| (p.name, p.unit_price)),
        };

        match found {
            Ok(snapshot) => Ok(snapshot),
            Err(RepositoryError::NotFound { .. }) => Err(OrderError::UnknownReference {
                item_type: line.item_type,
                ref_id: line.ref_id,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}

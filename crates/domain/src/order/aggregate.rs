//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{ClientId, OrderId, PartId, VehicleId};
use serde::Serialize;
use uuid::Uuid;

use super::{ItemType, Money, OrderError, OrderItem, OrderStatus};

/// Order aggregate root.
///
/// Totals are always derived from the items; they are recomputed after every
/// item change and when an order is restored from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    client_id: ClientId,
    vehicle_id: VehicleId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_service: Money,
    total_parts: Money,
    total: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// Stored order header, used to rebuild an [`Order`] from persistence.
#[derive(Debug, Clone)]
pub struct OrderHeader {
    pub id: OrderId,
    pub client_id: ClientId,
    pub vehicle_id: VehicleId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Opens a new order in `Received`.
    pub fn new(client_id: ClientId, vehicle_id: VehicleId) -> Result<Self, OrderError> {
        if client_id.is_nil() {
            return Err(OrderError::ClientIdRequired);
        }
        if vehicle_id.is_nil() {
            return Err(OrderError::VehicleIdRequired);
        }

        let now = Utc::now();
        Ok(Self {
            id: OrderId::new(),
            client_id,
            vehicle_id,
            status: OrderStatus::Received,
            items: Vec::new(),
            total_service: Money::zero(),
            total_parts: Money::zero(),
            total: Money::zero(),
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
        })
    }

    /// Rebuilds an order from its stored header and lines.
    pub fn restore(header: OrderHeader, items: Vec<OrderItem>) -> Self {
        let mut order = Self {
            id: header.id,
            client_id: header.client_id,
            vehicle_id: header.vehicle_id,
            status: header.status,
            items,
            total_service: Money::zero(),
            total_parts: Money::zero(),
            total: Money::zero(),
            created_at: header.created_at,
            updated_at: header.updated_at,
            started_at: header.started_at,
            finished_at: header.finished_at,
        };
        order.recalculate_totals();
        order
    }

    /// Returns the header fields of this order.
    pub fn header(&self) -> OrderHeader {
        OrderHeader {
            id: self.id,
            client_id: self.client_id,
            vehicle_id: self.vehicle_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order lines in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Sum of labor lines.
    pub fn total_service(&self) -> Money {
        self.total_service
    }

    /// Sum of part lines.
    pub fn total_parts(&self) -> Money {
        self.total_parts
    }

    /// Returns the grand total.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// When execution started (set on approval).
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When execution finished.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns true if the order still needs shop attention.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Key for the active-order board, or `None` when the order is not active.
    pub fn active_sort_key(&self) -> Option<(u8, DateTime<Utc>)> {
        self.status
            .active_priority()
            .map(|priority| (priority, self.created_at))
    }

    /// Total quantity requested per part, in first-seen order.
    pub fn part_demand(&self) -> Vec<(PartId, u32)> {
        let mut demand: Vec<(PartId, u32)> = Vec::new();
        for item in &self.items {
            let Some(part_id) = item.part_id() else {
                continue;
            };
            match demand.iter_mut().find(|(id, _)| *id == part_id) {
                Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
                None => demand.push((part_id, item.quantity)),
            }
        }
        demand
    }

    /// Execution time in minutes, when both timestamps are set.
    pub fn execution_minutes(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => {
                Some((finished - started).num_seconds() as f64 / 60.0)
            }
            _ => None,
        }
    }
}

// Command methods
impl Order {
    /// Adds a priced line and recomputes the totals.
    pub fn add_item(
        &mut self,
        ref_id: Uuid,
        item_type: ItemType,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<&OrderItem, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity: 0 });
        }

        self.items.push(OrderItem::new(
            self.id, ref_id, item_type, name, quantity, unit_price,
        ));
        self.recalculate_totals();
        self.updated_at = Utc::now();

        Ok(&self.items[self.items.len() - 1])
    }

    /// Received -> In diagnosis.
    pub fn start_diagnosis(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_start_diagnosis(),
            "start diagnosis",
            &[OrderStatus::Received],
        )?;
        self.move_to(OrderStatus::InDiagnosis);
        Ok(())
    }

    /// In diagnosis -> Awaiting approval.
    pub fn send_budget(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_send_budget(),
            "send budget",
            &[OrderStatus::InDiagnosis],
        )?;
        self.move_to(OrderStatus::AwaitingApproval);
        Ok(())
    }

    /// Received or Awaiting approval -> In execution, stamping `started_at`.
    ///
    /// Only the status change; stock is reserved by the lifecycle service.
    pub fn approve(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_approve(),
            "approve",
            &[OrderStatus::Received, OrderStatus::AwaitingApproval],
        )?;
        self.move_to(OrderStatus::InExecution);
        self.started_at = Some(self.updated_at);
        Ok(())
    }

    /// Awaiting approval -> Received.
    pub fn reject_budget(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_reject_budget(),
            "reject budget",
            &[OrderStatus::AwaitingApproval],
        )?;
        self.move_to(OrderStatus::Received);
        Ok(())
    }

    /// In execution -> Completed, stamping `finished_at`.
    pub fn finish(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_finish(),
            "finish",
            &[OrderStatus::InExecution],
        )?;
        self.move_to(OrderStatus::Completed);
        self.finished_at = Some(self.updated_at);
        Ok(())
    }

    /// Completed -> Delivered.
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.ensure(
            self.status.can_deliver(),
            "deliver",
            &[OrderStatus::Completed],
        )?;
        self.move_to(OrderStatus::Delivered);
        Ok(())
    }

    /// Sets the status without consulting the transition table.
    ///
    /// Timestamps other than `updated_at` are left as they are.
    pub fn override_status(&mut self, status: OrderStatus) {
        self.move_to(status);
    }

    fn ensure(
        &self,
        allowed: bool,
        action: &'static str,
        required: &'static [OrderStatus],
    ) -> Result<(), OrderError> {
        if allowed {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                current: self.status,
                action,
                required,
            })
        }
    }

    fn move_to(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    fn recalculate_totals(&mut self) {
        let (services, parts): (Vec<&OrderItem>, Vec<&OrderItem>) = self
            .items
            .iter()
            .partition(|item| item.item_type == ItemType::Service);
        self.total_service = services.iter().map(|item| item.total).sum();
        self.total_parts = parts.iter().map(|item| item.total).sum();
        self.total = self.total_service + self.total_parts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order() -> Order {
        Order::new(ClientId::new(), VehicleId::new()).unwrap()
    }

    #[test]
    fn test_new_order_is_received_with_zero_total() {
        let order = new_order();
        assert_eq!(order.status(), OrderStatus::Received);
        assert!(order.items().is_empty());
        assert_eq!(order.total(), Money::zero());
        assert_eq!(order.created_at(), order.updated_at());
        assert!(order.started_at().is_none());
        assert!(order.finished_at().is_none());
    }

    #[test]
    fn test_new_order_requires_ids() {
        assert_eq!(
            Order::new(ClientId::nil(), VehicleId::new()).unwrap_err(),
            OrderError::ClientIdRequired
        );
        assert_eq!(
            Order::new(ClientId::new(), VehicleId::nil()).unwrap_err(),
            OrderError::VehicleIdRequired
        );
    }

    #[test]
    fn test_add_item_partitions_totals() {
        let mut order = new_order();
        order
            .add_item(Uuid::new_v4(), ItemType::Service, "Alignment", 1, Money::from_cents(8000))
            .unwrap();
        order
            .add_item(Uuid::new_v4(), ItemType::Part, "Brake pad", 4, Money::from_cents(2550))
            .unwrap();
        order
            .add_item(Uuid::new_v4(), ItemType::Service, "Balancing", 2, Money::from_cents(1500))
            .unwrap();

        assert_eq!(order.total_service().cents(), 11_000);
        assert_eq!(order.total_parts().cents(), 10_200);
        assert_eq!(order.total().cents(), 21_200);

        let line_sum: u64 = order
            .items()
            .iter()
            .map(|i| i.unit_price.cents() * u64::from(i.quantity))
            .sum();
        assert_eq!(order.total().cents(), line_sum);
    }

    #[test]
    fn test_add_item_rejects_zero_quantity() {
        let mut order = new_order();
        let err = order
            .add_item(Uuid::new_v4(), ItemType::Part, "Bulb", 0, Money::from_cents(500))
            .unwrap_err();
        assert_eq!(err, OrderError::InvalidQuantity { quantity: 0 });
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_add_item_stamps_order_id() {
        let mut order = new_order();
        let id = order.id();
        let item = order
            .add_item(Uuid::new_v4(), ItemType::Part, "Bulb", 1, Money::from_cents(500))
            .unwrap();
        assert_eq!(item.order_id, id);
    }

    #[test]
    fn test_full_happy_path() {
        let mut order = new_order();
        order.start_diagnosis().unwrap();
        assert_eq!(order.status(), OrderStatus::InDiagnosis);
        order.send_budget().unwrap();
        assert_eq!(order.status(), OrderStatus::AwaitingApproval);
        order.approve().unwrap();
        assert_eq!(order.status(), OrderStatus::InExecution);
        assert!(order.started_at().is_some());
        order.finish().unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.finished_at().is_some());
        order.deliver().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.execution_minutes().is_some());
    }

    #[test]
    fn test_direct_approval_from_received() {
        let mut order = new_order();
        order.approve().unwrap();
        assert_eq!(order.status(), OrderStatus::InExecution);
    }

    #[test]
    fn test_reject_budget_returns_to_received() {
        let mut order = new_order();
        order.start_diagnosis().unwrap();
        order.send_budget().unwrap();
        order.reject_budget().unwrap();
        assert_eq!(order.status(), OrderStatus::Received);
    }

    #[test]
    fn test_wrong_source_leaves_status_unchanged() {
        let mut order = new_order();
        let before = order.clone();

        let err = order.finish().unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidStateTransition {
                current: OrderStatus::Received,
                action: "finish",
                ..
            }
        ));
        assert!(order.deliver().is_err());
        assert!(order.send_budget().is_err());
        assert!(order.reject_budget().is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn test_delivered_is_terminal() {
        let mut order = new_order();
        order.approve().unwrap();
        order.finish().unwrap();
        order.deliver().unwrap();

        assert!(order.start_diagnosis().is_err());
        assert!(order.approve().is_err());
        assert!(order.finish().is_err());
        assert!(order.deliver().is_err());
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_override_status_skips_table() {
        let mut order = new_order();
        order.override_status(OrderStatus::Completed);
        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.finished_at().is_none());
    }

    #[test]
    fn test_part_demand_merges_lines_for_same_part() {
        let mut order = new_order();
        let filter = Uuid::new_v4();
        let pads = Uuid::new_v4();
        order
            .add_item(filter, ItemType::Part, "Filter", 1, Money::from_cents(100))
            .unwrap();
        order
            .add_item(Uuid::new_v4(), ItemType::Service, "Labor", 1, Money::from_cents(100))
            .unwrap();
        order
            .add_item(pads, ItemType::Part, "Pads", 2, Money::from_cents(100))
            .unwrap();
        order
            .add_item(filter, ItemType::Part, "Filter", 3, Money::from_cents(100))
            .unwrap();

        assert_eq!(
            order.part_demand(),
            vec![(PartId::from_uuid(filter), 4), (PartId::from_uuid(pads), 2)]
        );
    }

    #[test]
    fn test_restore_recomputes_totals() {
        let mut order = new_order();
        order
            .add_item(Uuid::new_v4(), ItemType::Part, "Pads", 2, Money::from_cents(1250))
            .unwrap();
        order.start_diagnosis().unwrap();

        let restored = Order::restore(order.header(), order.items().to_vec());
        assert_eq!(restored, order);
        assert_eq!(restored.total_parts().cents(), 2500);
    }

    #[test]
    fn test_active_sort_key() {
        let mut order = new_order();
        assert_eq!(order.active_sort_key().map(|k| k.0), Some(4));
        order.approve().unwrap();
        assert_eq!(order.active_sort_key().map(|k| k.0), Some(1));
        order.finish().unwrap();
        assert!(order.active_sort_key().is_none());
    }
}

//! Order lifecycle service.

use std::sync::Arc;

use common::{OrderId, PartId};

use crate::client::Client;
use crate::error::DomainError;
use crate::inventory::Part;
use crate::notification::{NotificationOutcome, Notifier};
use crate::reports::{self, ExecutionTimeReport, RevenueReport};
use crate::repository::{ClientRepository, OrderRepository, PartRepository};

use super::{Order, OrderError, OrderStatus};

/// An order after a successful transition, with the notification outcome.
///
/// The notification is advisory; callers may ignore it.
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub order: Order,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, Copy)]
enum Message {
    StatusUpdate,
    BudgetReady,
    BudgetRejected,
}

impl Message {
    fn render(self, order: &Order, client: &Client) -> (String, String) {
        match self {
            Message::StatusUpdate => (
                format!("Order Update: {}", order.status()),
                format!(
                    "Hello {}, your order {} status has been updated to: {}",
                    client.name,
                    order.id(),
                    order.status()
                ),
            ),
            Message::BudgetReady => (
                "Order Budget Ready".to_string(),
                format!(
                    "Your budget for order {} is ready. Total: {}",
                    order.id(),
                    order.total()
                ),
            ),
            Message::BudgetRejected => (
                "Order Budget Rejected".to_string(),
                format!(
                    "Hello {}, the budget for order {} has been rejected. \
                     The order has been returned to Received status.",
                    client.name,
                    order.id()
                ),
            ),
        }
    }
}

/// Service driving orders through their lifecycle.
///
/// Every transition loads the order, checks the source status, applies the
/// change, persists it, and then notifies the client on a best-effort basis.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    parts: Arc<dyn PartRepository>,
    clients: Arc<dyn ClientRepository>,
    notifier: Arc<dyn Notifier>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        parts: Arc<dyn PartRepository>,
        clients: Arc<dyn ClientRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            orders,
            parts,
            clients,
            notifier,
        }
    }

    /// Received -> In diagnosis.
    #[tracing::instrument(skip(self))]
    pub async fn start_diagnosis(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        self.transition(order_id, "start_diagnosis", Message::StatusUpdate, Order::start_diagnosis)
            .await
    }

    /// In diagnosis -> Awaiting approval, sending the budget to the client.
    #[tracing::instrument(skip(self))]
    pub async fn send_budget(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        self.transition(order_id, "send_budget", Message::BudgetReady, Order::send_budget)
            .await
    }

    /// Received or Awaiting approval -> In execution.
    ///
    /// Takes every part line out of stock first. If any part is short, no
    /// stock changes and the order stays where it was.
    #[tracing::instrument(skip(self))]
    pub async fn approve_order(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        let mut order = self.orders.get_by_id(order_id).await?;
        order.approve()?;

        let reserved = self.reserve_stock(&order).await?;

        if let Err(e) = self.orders.save(&order).await {
            tracing::error!(%order_id, error = %e, "order save failed after stock reservation");
            self.release_stock(&reserved).await;
            return Err(e.into());
        }

        Ok(self.completed(order, "approve_order", Message::StatusUpdate).await)
    }

    /// Awaiting approval -> Received.
    #[tracing::instrument(skip(self))]
    pub async fn reject_budget(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        self.transition(order_id, "reject_budget", Message::BudgetRejected, Order::reject_budget)
            .await
    }

    /// In execution -> Completed.
    #[tracing::instrument(skip(self))]
    pub async fn finish_order(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        self.transition(order_id, "finish_order", Message::StatusUpdate, Order::finish)
            .await
    }

    /// Completed -> Delivered.
    #[tracing::instrument(skip(self))]
    pub async fn deliver_order(&self, order_id: OrderId) -> Result<TransitionResult, DomainError> {
        self.transition(order_id, "deliver_order", Message::StatusUpdate, Order::deliver)
            .await
    }

    /// Operator override: sets any legal status without checking the
    /// transition table.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<TransitionResult, DomainError> {
        let status: OrderStatus = status.parse()?;
        self.transition(order_id, "update_status", Message::StatusUpdate, |order| {
            order.override_status(status);
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        Ok(self.orders.get_by_id(order_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.list().await?)
    }

    /// Orders needing attention, most urgent first.
    #[tracing::instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.list_active().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn revenue_report(&self) -> Result<RevenueReport, DomainError> {
        let orders = self.orders.list().await?;
        Ok(reports::revenue(&orders))
    }

    #[tracing::instrument(skip(self))]
    pub async fn execution_time_report(&self) -> Result<ExecutionTimeReport, DomainError> {
        let orders = self.orders.list().await?;
        Ok(reports::average_execution_time(&orders))
    }

    async fn transition<F>(
        &self,
        order_id: OrderId,
        operation: &'static str,
        message: Message,
        apply: F,
    ) -> Result<TransitionResult, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), OrderError>,
    {
        let mut order = self.orders.get_by_id(order_id).await?;
        apply(&mut order)?;
        self.orders.save(&order).await?;
        Ok(self.completed(order, operation, message).await)
    }

    async fn completed(
        &self,
        order: Order,
        operation: &'static str,
        message: Message,
    ) -> TransitionResult {
        metrics::counter!("order_transitions_total", "operation" => operation).increment(1);
        tracing::info!(order_id = %order.id(), status = %order.status(), operation, "order transitioned");

        let notification = self.notify(&order, message).await;
        TransitionResult {
            order,
            notification,
        }
    }

    /// Validates every part line against current stock, then writes all of
    /// them in one versioned batch. Returns what was taken.
    async fn reserve_stock(&self, order: &Order) -> Result<Vec<(PartId, u32)>, DomainError> {
        let demand = order.part_demand();
        let mut parts: Vec<Part> = Vec::with_capacity(demand.len());

        for &(part_id, quantity) in &demand {
            let mut part = self.parts.get_by_id(part_id).await?;
            if let Err(e) = part.remove_stock(quantity) {
                metrics::counter!("stock_reservations_failed_total").increment(1);
                tracing::info!(order_id = %order.id(), %part_id, error = %e, "stock reservation refused");
                return Err(e.into());
            }
            parts.push(part);
        }

        if parts.is_empty() {
            return Ok(demand);
        }
        if let Err(e) = self.parts.update_all(&parts).await {
            metrics::counter!("stock_reservations_failed_total").increment(1);
            return Err(e.into());
        }
        Ok(demand)
    }

    /// Puts reserved stock back. Failures are logged; there is nothing left
    /// to roll back to.
    async fn release_stock(&self, reserved: &[(PartId, u32)]) {
        if reserved.is_empty() {
            return;
        }

        let mut parts = Vec::with_capacity(reserved.len());
        for &(part_id, quantity) in reserved {
            match self.parts.get_by_id(part_id).await {
                Ok(mut part) => match part.add_stock(quantity) {
                    Ok(()) => parts.push(part),
                    Err(e) => {
                        tracing::error!(%part_id, quantity, error = %e, "failed to release stock");
                    }
                },
                Err(e) => {
                    tracing::error!(%part_id, quantity, error = %e, "failed to load part for stock release");
                }
            }
        }

        if let Err(e) = self.parts.update_all(&parts).await {
            tracing::error!(error = %e, "failed to release reserved stock");
        }
    }

    async fn notify(&self, order: &Order, message: Message) -> NotificationOutcome {
        let client = match self.clients.get_by_id(order.client_id()).await {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(order_id = %order.id(), error = %e, "client lookup failed, notification skipped");
                return NotificationOutcome::ClientUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        let (subject, body) = message.render(order, &client);
        match self.notifier.send_email(&client.email, &subject, &body).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => {
                tracing::warn!(order_id = %order.id(), error = %e, "notification failed");
                NotificationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{ItemType, Money};
    use common::{ClientId, VehicleId};

    #[test]
    fn test_message_templates() {
        let client = Client::new("Ana", "52998224725", "ana@example.com", "").unwrap();
        let mut order = Order::new(ClientId::new(), VehicleId::new()).unwrap();
        order
            .add_item(
                uuid::Uuid::new_v4(),
                ItemType::Service,
                "Alignment",
                1,
                Money::from_cents(15050),
            )
            .unwrap();
        order.start_diagnosis().unwrap();

        let (subject, body) = Message::StatusUpdate.render(&order, &client);
        assert_eq!(subject, "Order Update: In diagnosis");
        assert_eq!(
            body,
            format!(
                "Hello Ana, your order {} status has been updated to: In diagnosis",
                order.id()
            )
        );

        let (subject, body) = Message::BudgetReady.render(&order, &client);
        assert_eq!(subject, "Order Budget Ready");
        assert_eq!(
            body,
            format!("Your budget for order {} is ready. Total: 150.50", order.id())
        );

        let (subject, body) = Message::BudgetRejected.render(&order, &client);
        assert_eq!(subject, "Order Budget Rejected");
        assert!(body.ends_with("The order has been returned to Received status."));
    }
}

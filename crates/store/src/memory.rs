//! In-memory repositories.
//!
//! These provide the same interface as the PostgreSQL implementations and
//! back the server when no database is configured.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{ClientId, LaborServiceId, OrderId, PartId, UserId, VehicleId};
use domain::{
    Client, ClientRepository, LaborService, LaborServiceRepository, Order, OrderRepository, Part,
    PartRepository, RepositoryError, User, UserRepository, Vehicle, VehicleRepository,
};
use tokio::sync::RwLock;

/// In-memory order repository.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `save` fail with a storage error.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::storage("simulated save failure"));
        }
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Order, RepositoryError> {
        self.orders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("order", id))
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by_key(Order::created_at);
        Ok(orders)
    }

    async fn list_active(&self) -> Result<Vec<Order>, RepositoryError> {
        let store = self.orders.read().await;
        let mut active: Vec<((u8, _), Order)> = store
            .values()
            .filter_map(|order| order.active_sort_key().map(|key| (key, order.clone())))
            .collect();
        active.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(active.into_iter().map(|(_, order)| order).collect())
    }
}

/// In-memory part repository with version checks.
#[derive(Clone, Default)]
pub struct InMemoryPartRepository {
    parts: Arc<RwLock<HashMap<PartId, Part>>>,
}

impl InMemoryPartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(stored: &HashMap<PartId, Part>, part: &Part) -> Result<(), RepositoryError> {
    match stored.get(&part.id) {
        None => Err(RepositoryError::not_found("part", part.id)),
        Some(current) if current.version() != part.version() => {
            Err(RepositoryError::conflict("part", part.id))
        }
        Some(_) => Ok(()),
    }
}

fn bumped(part: &Part) -> Part {
    let mut next = part.clone();
    next.set_version(part.version() + 1);
    next
}

#[async_trait]
impl PartRepository for InMemoryPartRepository {
    async fn save(&self, part: &Part) -> Result<(), RepositoryError> {
        self.parts.write().await.insert(part.id, part.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: PartId) -> Result<Part, RepositoryError> {
        self.parts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("part", id))
    }

    async fn update(&self, part: &Part) -> Result<(), RepositoryError> {
        let mut store = self.parts.write().await;
        check_version(&store, part)?;
        store.insert(part.id, bumped(part));
        Ok(())
    }

    async fn update_all(&self, parts: &[Part]) -> Result<(), RepositoryError> {
        let mut store = self.parts.write().await;
        for part in parts {
            check_version(&store, part)?;
        }
        for part in parts {
            store.insert(part.id, bumped(part));
        }
        Ok(())
    }

    async fn delete(&self, id: PartId) -> Result<(), RepositoryError> {
        self.parts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("part", id))
    }

    async fn list(&self) -> Result<Vec<Part>, RepositoryError> {
        let mut parts: Vec<Part> = self.parts.read().await.values().cloned().collect();
        parts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parts)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn save(&self, client: &Client) -> Result<(), RepositoryError> {
        self.clients.write().await.insert(client.id, client.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: ClientId) -> Result<Client, RepositoryError> {
        self.clients
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("client", id))
    }

    async fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        let mut clients: Vec<Client> = self.clients.read().await.values().cloned().collect();
        clients.sort_by_key(|c| c.created_at);
        Ok(clients)
    }

    async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        self.clients
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("client", id))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVehicleRepository {
    vehicles: Arc<RwLock<HashMap<VehicleId, Vehicle>>>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleRepository for InMemoryVehicleRepository {
    async fn save(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        self.vehicles
            .write()
            .await
            .insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: VehicleId) -> Result<Vehicle, RepositoryError> {
        self.vehicles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("vehicle", id))
    }

    async fn list_by_client(&self, client_id: ClientId) -> Result<Vec<Vehicle>, RepositoryError> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .read()
            .await
            .values()
            .filter(|v| v.client_id == client_id)
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.created_at);
        Ok(vehicles)
    }

    async fn delete(&self, id: VehicleId) -> Result<(), RepositoryError> {
        self.vehicles
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("vehicle", id))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLaborServiceRepository {
    services: Arc<RwLock<HashMap<LaborServiceId, LaborService>>>,
}

impl InMemoryLaborServiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LaborServiceRepository for InMemoryLaborServiceRepository {
    async fn save(&self, service: &LaborService) -> Result<(), RepositoryError> {
        self.services
            .write()
            .await
            .insert(service.id, service.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: LaborServiceId) -> Result<LaborService, RepositoryError> {
        self.services
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("service", id))
    }

    async fn list(&self) -> Result<Vec<LaborService>, RepositoryError> {
        let mut services: Vec<LaborService> =
            self.services.read().await.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn delete(&self, id: LaborServiceId) -> Result<(), RepositoryError> {
        self.services
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("service", id))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        let mut store = self.users.write().await;
        if store
            .values()
            .any(|other| other.email == user.email && other.id != user.id)
        {
            return Err(RepositoryError::Duplicate {
                entity: "user",
                key: user.email.clone(),
            });
        }
        store.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let email = email.trim().to_lowercase();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("user", email))
    }

    async fn get_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use domain::{OrderHeader, OrderStatus, Role};

    use super::*;

    fn order_with(status: OrderStatus, age_minutes: i64) -> Order {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Order::restore(
            OrderHeader {
                id: OrderId::new(),
                client_id: ClientId::new(),
                vehicle_id: VehicleId::new(),
                status,
                created_at: created,
                updated_at: created,
                started_at: None,
                finished_at: None,
            },
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_order_save_and_get() {
        let repo = InMemoryOrderRepository::new();
        let order = Order::new(ClientId::new(), VehicleId::new()).unwrap();
        repo.save(&order).await.unwrap();

        assert_eq!(repo.get_by_id(order.id()).await.unwrap(), order);
        assert!(matches!(
            repo.get_by_id(OrderId::new()).await,
            Err(RepositoryError::NotFound { entity: "order", .. })
        ));
    }

    #[tokio::test]
    async fn test_order_fail_on_save() {
        let repo = InMemoryOrderRepository::new();
        repo.set_fail_on_save(true);
        let order = Order::new(ClientId::new(), VehicleId::new()).unwrap();
        assert!(matches!(
            repo.save(&order).await,
            Err(RepositoryError::Storage(_))
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_active_orders_by_priority_then_age() {
        let repo = InMemoryOrderRepository::new();
        let old_received = order_with(OrderStatus::Received, 50);
        let new_received = order_with(OrderStatus::Received, 5);
        let diagnosis = order_with(OrderStatus::InDiagnosis, 1);
        let awaiting = order_with(OrderStatus::AwaitingApproval, 30);
        let executing = order_with(OrderStatus::InExecution, 2);
        let completed = order_with(OrderStatus::Completed, 100);
        let delivered = order_with(OrderStatus::Delivered, 200);

        for order in [
            &new_received,
            &completed,
            &diagnosis,
            &old_received,
            &delivered,
            &executing,
            &awaiting,
        ] {
            repo.save(order).await.unwrap();
        }

        let ids: Vec<OrderId> = repo
            .list_active()
            .await
            .unwrap()
            .iter()
            .map(Order::id)
            .collect();
        assert_eq!(
            ids,
            vec![
                executing.id(),
                awaiting.id(),
                diagnosis.id(),
                old_received.id(),
                new_received.id(),
            ]
        );
        assert_eq!(repo.list().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_part_update_bumps_version() {
        let repo = InMemoryPartRepository::new();
        let part = Part::create("Spark plug", "", 10, 1500).unwrap();
        repo.save(&part).await.unwrap();

        let mut loaded = repo.get_by_id(part.id).await.unwrap();
        loaded.remove_stock(3).unwrap();
        repo.update(&loaded).await.unwrap();

        let reloaded = repo.get_by_id(part.id).await.unwrap();
        assert_eq!(reloaded.quantity(), 7);
        assert_eq!(reloaded.version(), 1);
    }

    #[tokio::test]
    async fn test_part_stale_update_conflicts() {
        let repo = InMemoryPartRepository::new();
        let part = Part::create("Spark plug", "", 10, 1500).unwrap();
        repo.save(&part).await.unwrap();

        let mut first = repo.get_by_id(part.id).await.unwrap();
        let mut second = first.clone();
        first.remove_stock(1).unwrap();
        second.remove_stock(2).unwrap();

        repo.update(&first).await.unwrap();
        assert!(matches!(
            repo.update(&second).await,
            Err(RepositoryError::Conflict { entity: "part", .. })
        ));
        assert_eq!(repo.get_by_id(part.id).await.unwrap().quantity(), 9);
    }

    #[tokio::test]
    async fn test_update_all_is_all_or_nothing() {
        let repo = InMemoryPartRepository::new();
        let a = Part::create("A", "", 5, 100).unwrap();
        let b = Part::create("B", "", 5, 100).unwrap();
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let mut a1 = repo.get_by_id(a.id).await.unwrap();
        let mut b1 = repo.get_by_id(b.id).await.unwrap();
        a1.remove_stock(1).unwrap();
        b1.remove_stock(1).unwrap();
        b1.set_version(42);

        assert!(repo.update_all(&[a1, b1]).await.is_err());
        assert_eq!(repo.get_by_id(a.id).await.unwrap().quantity(), 5);
        assert_eq!(repo.get_by_id(b.id).await.unwrap().quantity(), 5);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryClientRepository::new();
        assert!(matches!(
            repo.delete(ClientId::new()).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_vehicles_by_client() {
        let repo = InMemoryVehicleRepository::new();
        let owner = ClientId::new();
        let mine = Vehicle::new(owner, "ABC1234", "Fiat", "Uno", 2010).unwrap();
        let other = Vehicle::new(ClientId::new(), "BRA2E19", "VW", "Gol", 2020).unwrap();
        repo.save(&mine).await.unwrap();
        repo.save(&other).await.unwrap();

        let listed = repo.list_by_client(owner).await.unwrap();
        assert_eq!(listed, vec![mine]);
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let repo = InMemoryUserRepository::new();
        let first = User::new("A", "a@shop.com", "pw", Role::Employee).unwrap();
        let second = User::new("B", "A@shop.com", "pw", Role::Manager).unwrap();
        repo.save(&first).await.unwrap();

        assert!(matches!(
            repo.save(&second).await,
            Err(RepositoryError::Duplicate { .. })
        ));
        assert_eq!(
            repo.get_by_email("A@SHOP.COM").await.unwrap().id,
            first.id
        );
    }
}

//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{ClientId, OrderId, VehicleId};
use domain::{
    Client, ClientRepository, ItemType, LaborService, LaborServiceRepository, Money, Order,
    OrderHeader, OrderRepository, OrderStatus, Part, PartRepository, RepositoryError, Role, User,
    UserRepository, Vehicle, VehicleRepository,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    PostgresClientRepository, PostgresLaborServiceRepository, PostgresOrderRepository,
    PostgresPartRepository, PostgresUserRepository, PostgresVehicleRepository,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            store::postgres::run_migrations(&temp_pool).await.unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh pool with cleared tables
async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = store::postgres::connect(&info.connection_string, 5)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, parts, services, vehicles, clients, users")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

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
#[serial]
async fn order_round_trip_with_items() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);

    let mut order = Order::new(ClientId::new(), VehicleId::new()).unwrap();
    order
        .add_item(uuid::Uuid::new_v4(), ItemType::Service, "Alignment", 1, Money::from_cents(8000))
        .unwrap();
    order
        .add_item(uuid::Uuid::new_v4(), ItemType::Part, "Pads", 4, Money::from_cents(2550))
        .unwrap();
    repo.save(&order).await.unwrap();

    let loaded = repo.get_by_id(order.id()).await.unwrap();
    assert_eq!(loaded.items(), order.items());
    assert_eq!(loaded.total().cents(), 18_200);
    assert_eq!(loaded.total_parts().cents(), 10_200);
    assert_eq!(loaded.status(), OrderStatus::Received);
}

#[tokio::test]
#[serial]
async fn order_save_replaces_header_and_items() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);

    let mut order = Order::new(ClientId::new(), VehicleId::new()).unwrap();
    order
        .add_item(uuid::Uuid::new_v4(), ItemType::Part, "Filter", 1, Money::from_cents(1000))
        .unwrap();
    repo.save(&order).await.unwrap();

    order
        .add_item(uuid::Uuid::new_v4(), ItemType::Part, "Oil", 4, Money::from_cents(500))
        .unwrap();
    order.approve().unwrap();
    repo.save(&order).await.unwrap();

    let loaded = repo.get_by_id(order.id()).await.unwrap();
    assert_eq!(loaded.items().len(), 2);
    assert_eq!(loaded.items()[1].name, "Oil");
    assert_eq!(loaded.status(), OrderStatus::InExecution);
    assert!(loaded.started_at().is_some());
}

#[tokio::test]
#[serial]
async fn missing_order_is_not_found() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);
    assert!(matches!(
        repo.get_by_id(OrderId::new()).await,
        Err(RepositoryError::NotFound { entity: "order", .. })
    ));
}

#[tokio::test]
#[serial]
async fn list_active_orders_by_priority_then_age() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);

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
#[serial]
async fn part_update_is_version_checked() {
    let repo = PostgresPartRepository::new(get_test_pool().await);
    let part = Part::create("Spark plug", "NGK", 10, 1500).unwrap();
    repo.save(&part).await.unwrap();

    let mut first = repo.get_by_id(part.id).await.unwrap();
    let mut stale = first.clone();
    first.remove_stock(2).unwrap();
    repo.update(&first).await.unwrap();

    stale.remove_stock(5).unwrap();
    assert!(matches!(
        repo.update(&stale).await,
        Err(RepositoryError::Conflict { entity: "part", .. })
    ));

    let loaded = repo.get_by_id(part.id).await.unwrap();
    assert_eq!(loaded.quantity(), 8);
    assert_eq!(loaded.version(), 1);
}

#[tokio::test]
#[serial]
async fn part_update_all_rolls_back_on_conflict() {
    let repo = PostgresPartRepository::new(get_test_pool().await);
    let a = Part::create("A", "", 5, 100).unwrap();
    let b = Part::create("B", "", 5, 100).unwrap();
    repo.save(&a).await.unwrap();
    repo.save(&b).await.unwrap();

    let mut a1 = repo.get_by_id(a.id).await.unwrap();
    let mut b1 = repo.get_by_id(b.id).await.unwrap();
    a1.remove_stock(1).unwrap();
    b1.remove_stock(1).unwrap();
    b1.set_version(99);

    assert!(repo.update_all(&[a1, b1]).await.is_err());
    assert_eq!(repo.get_by_id(a.id).await.unwrap().quantity(), 5);
    assert_eq!(repo.get_by_id(b.id).await.unwrap().quantity(), 5);
}

#[tokio::test]
#[serial]
async fn part_update_missing_is_not_found() {
    let repo = PostgresPartRepository::new(get_test_pool().await);
    let part = Part::create("Ghost", "", 1, 1).unwrap();
    assert!(matches!(
        repo.update(&part).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
#[serial]
async fn client_and_vehicle_crud() {
    let pool = get_test_pool().await;
    let clients = PostgresClientRepository::new(pool.clone());
    let vehicles = PostgresVehicleRepository::new(pool);

    let mut client = Client::new("Ana", "529.982.247-25", "ana@example.com", "1199").unwrap();
    clients.save(&client).await.unwrap();
    client.update("Ana Maria", "52998224725", "ana@example.com", "1199").unwrap();
    clients.save(&client).await.unwrap();
    assert_eq!(clients.get_by_id(client.id).await.unwrap().name, "Ana Maria");

    let vehicle = Vehicle::new(client.id, "BRA2E19", "Fiat", "Argo", 2022).unwrap();
    vehicles.save(&vehicle).await.unwrap();
    let listed = vehicles.list_by_client(client.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].plate, vehicle.plate);

    vehicles.delete(vehicle.id).await.unwrap();
    assert!(vehicles.get_by_id(vehicle.id).await.is_err());

    clients.delete(client.id).await.unwrap();
    assert!(clients.list().await.unwrap().is_empty());
    assert!(matches!(
        clients.delete(client.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
#[serial]
async fn labor_service_crud() {
    let repo = PostgresLaborServiceRepository::new(get_test_pool().await);
    let service = LaborService::new("Alignment", "", 8000).unwrap();
    repo.save(&service).await.unwrap();

    assert_eq!(repo.get_by_id(service.id).await.unwrap().price.cents(), 8000);
    assert_eq!(repo.list().await.unwrap().len(), 1);
    repo.delete(service.id).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn user_email_is_unique() {
    let repo = PostgresUserRepository::new(get_test_pool().await);
    let admin = User::new("Admin", "admin@autorepair.com", "admin123", Role::Admin).unwrap();
    repo.save(&admin).await.unwrap();

    let loaded = repo.get_by_email("ADMIN@autorepair.com").await.unwrap();
    assert_eq!(loaded.id, admin.id);
    assert!(loaded.check_password("admin123"));

    let clash = User::new("Other", "admin@autorepair.com", "pw", Role::Employee).unwrap();
    assert!(matches!(
        repo.save(&clash).await,
        Err(RepositoryError::Duplicate { .. })
    ));
}

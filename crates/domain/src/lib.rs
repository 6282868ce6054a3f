//! Domain layer for the auto-repair shop.
//!
//! This crate provides:
//! - Order aggregate with its status machine and pricing
//! - Order lifecycle service with stock reservation and client notification
//! - Parts inventory, clients, vehicles, labor services and staff users
//! - Repository and notifier ports implemented by the `store` crate

pub mod catalog;
pub mod client;
pub mod error;
pub mod identity;
pub mod inventory;
pub mod notification;
pub mod order;
pub mod reports;
pub mod repository;
pub mod vehicle;

pub use catalog::{CatalogError, LaborService};
pub use client::{Client, ClientError};
pub use error::DomainError;
pub use identity::{HashedPassword, IdentityError, Role, User};
pub use inventory::{InventoryError, Part};
pub use notification::{
    ConsoleNotifier, InMemoryNotifier, NotificationOutcome, Notifier, NotifierError, SentEmail,
};
pub use order::{
    ItemType, Money, MoneyError, Order, OrderError, OrderHeader, OrderIntake, OrderItem,
    OrderLine, OrderService, OrderStatus, TransitionResult,
};
pub use reports::{ExecutionTimeReport, RevenueReport};
pub use repository::{
    ClientRepository, LaborServiceRepository, OrderRepository, PartRepository, RepositoryError,
    UserRepository, VehicleRepository,
};
pub use vehicle::{Vehicle, VehicleError};

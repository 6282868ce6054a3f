//! Shared types for the auto-repair shop system.
//!
//! Typed entity identifiers plus the Brazilian registry value types
//! (CPF/CNPJ documents and license plates) used by clients and vehicles.

pub mod document;
pub mod error;
pub mod plate;
pub mod types;

pub use document::{Document, DocumentKind};
pub use error::ValidationError;
pub use plate::Plate;
pub use types::{ClientId, LaborServiceId, OrderId, OrderItemId, PartId, UserId, VehicleId};

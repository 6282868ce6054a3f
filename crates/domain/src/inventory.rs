//! Parts inventory.

use chrono::{DateTime, Utc};
use common::PartId;
use serde::Serialize;
use thiserror::Error;

use crate::order::{Money, MoneyError};

/// Errors raised by part construction and stock changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Part name is required")]
    NameRequired,

    #[error("Invalid stock quantity: {quantity} (must not be negative)")]
    NegativeQuantity { quantity: i64 },

    #[error("Invalid stock quantity: {quantity} (at most {max})", max = u32::MAX)]
    QuantityTooLarge { quantity: i64 },

    #[error("Restocking part {part_id} by {added} would exceed {max} units on hand", max = u32::MAX)]
    StockOverflow { part_id: PartId, added: u32 },

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] MoneyError),

    /// Not enough units on hand.
    #[error("Insufficient stock for part {part_id}: requested {requested}, available {available}")]
    InsufficientStock {
        part_id: PartId,
        requested: u32,
        available: u32,
    },
}

impl InventoryError {
    /// Returns true for input errors (as opposed to stock conflicts).
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, InventoryError::InsufficientStock { .. })
    }
}

/// A stocked part.
///
/// Stock only changes through [`Part::add_stock`], [`Part::remove_stock`] and
/// the administrative [`Part::set_stock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub description: String,
    quantity: u32,
    pub unit_price: Money,
    /// Optimistic concurrency token, bumped by the repository on every update.
    #[serde(skip)]
    version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Creates a new part from raw input.
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<Self, InventoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::NameRequired);
        }
        let quantity = stock_from_i64(quantity)?;
        let unit_price = Money::try_from_cents(unit_price_cents)?;

        let now = Utc::now();
        Ok(Self {
            id: PartId::new(),
            name,
            description: description.into(),
            quantity,
            unit_price,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a part from storage.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: PartId,
        name: String,
        description: String,
        quantity: u32,
        unit_price: Money,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            quantity,
            unit_price,
            version,
            created_at,
            updated_at,
        }
    }

    /// Units on hand.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Version this copy was read at.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Sets the version after a successful write.
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    /// Adds units to stock. On-hand stock is capped at `u32::MAX`.
    pub fn add_stock(&mut self, quantity: u32) -> Result<(), InventoryError> {
        let on_hand = self
            .quantity
            .checked_add(quantity)
            .ok_or(InventoryError::StockOverflow {
                part_id: self.id,
                added: quantity,
            })?;
        self.quantity = on_hand;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Takes units out of stock; all or nothing.
    pub fn remove_stock(&mut self, quantity: u32) -> Result<(), InventoryError> {
        if quantity > self.quantity {
            return Err(InventoryError::InsufficientStock {
                part_id: self.id,
                requested: quantity,
                available: self.quantity,
            });
        }
        self.quantity -= quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the stock count.
    pub fn set_stock(&mut self, quantity: i64) -> Result<(), InventoryError> {
        self.quantity = stock_from_i64(quantity)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies an administrative edit of the descriptive fields and price.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        unit_price_cents: i64,
    ) -> Result<(), InventoryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::NameRequired);
        }
        self.unit_price = Money::try_from_cents(unit_price_cents)?;
        self.name = name;
        self.description = description.into();
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn stock_from_i64(quantity: i64) -> Result<u32, InventoryError> {
    if quantity < 0 {
        return Err(InventoryError::NegativeQuantity { quantity });
    }
    u32::try_from(quantity).map_err(|_| InventoryError::QuantityTooLarge { quantity })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(stock: i64) -> Part {
        Part::create("Oil filter", "Fits most sedans", stock, 3500).unwrap()
    }

    #[test]
    fn test_create_part() {
        let p = part(10);
        assert_eq!(p.quantity(), 10);
        assert_eq!(p.unit_price.cents(), 3500);
        assert_eq!(p.version(), 0);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        assert_eq!(
            Part::create("", "", 1, 1).unwrap_err(),
            InventoryError::NameRequired
        );
        assert_eq!(
            Part::create("Bulb", "", -1, 1).unwrap_err(),
            InventoryError::NegativeQuantity { quantity: -1 }
        );
        assert!(matches!(
            Part::create("Bulb", "", 1, -5).unwrap_err(),
            InventoryError::InvalidPrice(_)
        ));
    }

    #[test]
    fn test_remove_stock_exact() {
        let mut p = part(10);
        p.remove_stock(2).unwrap();
        assert_eq!(p.quantity(), 8);
        p.remove_stock(8).unwrap();
        assert_eq!(p.quantity(), 0);
    }

    #[test]
    fn test_remove_stock_insufficient_leaves_quantity() {
        let mut p = part(3);
        let err = p.remove_stock(4).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                part_id: p.id,
                requested: 4,
                available: 3,
            }
        );
        assert!(!err.is_invalid_argument());
        assert_eq!(p.quantity(), 3);
    }

    #[test]
    fn test_add_stock() {
        let mut p = part(0);
        p.add_stock(5).unwrap();
        assert_eq!(p.quantity(), 5);
    }

    #[test]
    fn test_add_stock_rejects_overflow() {
        let mut p = part(i64::from(u32::MAX) - 1);
        p.add_stock(1).unwrap();
        assert_eq!(
            p.add_stock(1).unwrap_err(),
            InventoryError::StockOverflow {
                part_id: p.id,
                added: 1,
            }
        );
        assert_eq!(p.quantity(), u32::MAX);
    }

    #[test]
    fn test_stock_above_range_is_too_large() {
        let too_many = i64::from(u32::MAX) + 1;
        assert_eq!(
            Part::create("Bulb", "", too_many, 1).unwrap_err(),
            InventoryError::QuantityTooLarge { quantity: too_many }
        );
        let mut p = part(4);
        assert_eq!(
            p.set_stock(too_many).unwrap_err(),
            InventoryError::QuantityTooLarge { quantity: too_many }
        );
        assert_eq!(p.quantity(), 4);
    }

    #[test]
    fn test_set_stock() {
        let mut p = part(4);
        p.set_stock(12).unwrap();
        assert_eq!(p.quantity(), 12);
        assert!(p.set_stock(-2).is_err());
        assert_eq!(p.quantity(), 12);
    }

    #[test]
    fn test_update_details() {
        let mut p = part(4);
        p.update_details("Air filter", "", 1200).unwrap();
        assert_eq!(p.name, "Air filter");
        assert_eq!(p.unit_price.cents(), 1200);
        assert!(p.update_details(" ", "", 1).is_err());
        assert_eq!(p.name, "Air filter");
    }
}

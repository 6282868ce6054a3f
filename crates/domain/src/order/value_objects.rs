//! Value objects for the order domain.

use common::{OrderId, OrderItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Rejected money input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Invalid amount: {cents} cents (must not be negative)")]
    Negative { cents: i64 },
}

/// Money amount in cents. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = R$10.00)
    cents: u64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Converts a signed cent count, rejecting negative values.
    pub fn try_from_cents(cents: i64) -> Result<Self, MoneyError> {
        u64::try_from(cents)
            .map(Self::from_cents)
            .map_err(|_| MoneyError::Negative { cents })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> u64 {
        self.cents
    }

    /// Returns the amount in cents as a signed integer, saturating at `i64::MAX`.
    pub fn cents_i64(&self) -> i64 {
        i64::try_from(self.cents).unwrap_or(i64::MAX)
    }

    /// Returns the whole-currency portion.
    pub fn units(&self) -> u64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after units).
    pub fn cents_part(&self) -> u64 {
        self.cents % 100
    }

    /// Multiplies by a quantity, saturating on overflow.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(u64::from(quantity)),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.units(), self.cents_part())
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl TryFrom<i64> for Money {
    type Error = MoneyError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::try_from_cents(cents)
    }
}

/// What an order line bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Labor from the service catalog.
    Service,
    /// A stocked part; consumed from inventory on approval.
    Part,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Service => "service",
            ItemType::Part => "part",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = super::OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service" => Ok(ItemType::Service),
            "part" => Ok(ItemType::Part),
            other => Err(super::OrderError::UnknownItemType(other.to_string())),
        }
    }
}

/// A line on a service order.
///
/// Name and unit price are snapshots taken when the line was added; later
/// catalog edits do not change them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,

    /// The order this line belongs to.
    pub order_id: OrderId,

    /// Id of the labor service or part being billed.
    pub ref_id: Uuid,

    pub item_type: ItemType,

    pub name: String,

    pub quantity: u32,

    pub unit_price: Money,

    /// `unit_price * quantity`.
    pub total: Money,
}

impl OrderItem {
    /// Creates a new order line with a fresh id and computed total.
    pub fn new(
        order_id: OrderId,
        ref_id: Uuid,
        item_type: ItemType,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            id: OrderItemId::new(),
            order_id,
            ref_id,
            item_type,
            name: name.into(),
            quantity,
            unit_price,
            total: unit_price.multiply(quantity),
        }
    }

    /// Returns the part id when this line consumes stock.
    pub fn part_id(&self) -> Option<common::PartId> {
        match self.item_type {
            ItemType::Part => Some(common::PartId::from_uuid(self.ref_id)),
            ItemType::Service => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_rejects_negative() {
        assert_eq!(
            Money::try_from_cents(-1),
            Err(MoneyError::Negative { cents: -1 })
        );
        assert_eq!(Money::try_from_cents(0).unwrap(), Money::zero());
        assert_eq!(Money::try_from(250).unwrap().cents(), 250);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::from_cents(100).to_string(), "1.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!(a.multiply(3).cents(), 3000);
        assert_eq!(a.multiply(0), Money::zero());

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_money_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(4200)).unwrap();
        assert_eq!(json, "4200");
    }

    #[test]
    fn test_item_type_parse() {
        assert_eq!("part".parse::<ItemType>().unwrap(), ItemType::Part);
        assert_eq!("service".parse::<ItemType>().unwrap(), ItemType::Service);
        assert!("tyre".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_order_item_total() {
        let item = OrderItem::new(
            OrderId::new(),
            Uuid::new_v4(),
            ItemType::Part,
            "Oil filter",
            3,
            Money::from_cents(1000),
        );
        assert_eq!(item.total.cents(), 3000);
        assert_eq!(item.part_id().map(|p| p.as_uuid()), Some(item.ref_id));
    }

    #[test]
    fn test_service_item_has_no_part_id() {
        let item = OrderItem::new(
            OrderId::new(),
            Uuid::new_v4(),
            ItemType::Service,
            "Alignment",
            1,
            Money::from_cents(8000),
        );
        assert!(item.part_id().is_none());
    }
}

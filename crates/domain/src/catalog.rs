//! Labor services offered by the shop.

use chrono::{DateTime, Utc};
use common::LaborServiceId;
use serde::Serialize;
use thiserror::Error;

use crate::order::{Money, MoneyError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Service name is required")]
    NameRequired,

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] MoneyError),
}

/// A priced unit of labor, such as an alignment or an oil change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaborService {
    pub id: LaborServiceId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LaborService {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::NameRequired);
        }
        let price = Money::try_from_cents(price_cents)?;

        let now = Utc::now();
        Ok(Self {
            id: LaborServiceId::new(),
            name,
            description: description.into(),
            price,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price_cents: i64,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::NameRequired);
        }
        self.price = Money::try_from_cents(price_cents)?;
        self.name = name;
        self.description = description.into();
        self.updated_at = Utc::now();
        Ok(())
    }
}

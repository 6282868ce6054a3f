//! Client vehicles.

use chrono::{DateTime, Datelike, Utc};
use common::{ClientId, Plate, ValidationError, VehicleId};
use serde::Serialize;
use thiserror::Error;

/// Oldest accepted model year.
pub const MIN_YEAR: i32 = 1900;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VehicleError {
    #[error("Client ID is required")]
    ClientIdRequired,

    #[error("Brand and model are required")]
    BrandAndModelRequired,

    #[error("Invalid year: {year} (must be between {MIN_YEAR} and {max})")]
    InvalidYear { year: i32, max: i32 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub client_id: ClientId,
    pub plate: Plate,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        client_id: ClientId,
        plate: &str,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: i32,
    ) -> Result<Self, VehicleError> {
        if client_id.is_nil() {
            return Err(VehicleError::ClientIdRequired);
        }
        let (brand, model) = validate_details(brand.into(), model.into(), year)?;
        let plate = Plate::parse(plate)?;

        let now = Utc::now();
        Ok(Self {
            id: VehicleId::new(),
            client_id,
            plate,
            brand,
            model,
            year,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces plate, brand, model and year. The owner does not change.
    pub fn update(
        &mut self,
        plate: &str,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: i32,
    ) -> Result<(), VehicleError> {
        let (brand, model) = validate_details(brand.into(), model.into(), year)?;
        self.plate = Plate::parse(plate)?;
        self.brand = brand;
        self.model = model;
        self.year = year;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_details(
    brand: String,
    model: String,
    year: i32,
) -> Result<(String, String), VehicleError> {
    if brand.trim().is_empty() || model.trim().is_empty() {
        return Err(VehicleError::BrandAndModelRequired);
    }
    let max = Utc::now().year() + 1;
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(VehicleError::InvalidYear { year, max });
    }
    Ok((brand, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vehicle() {
        let v = Vehicle::new(ClientId::new(), "abc-1234", "Fiat", "Uno", 2010).unwrap();
        assert_eq!(v.plate.as_str(), "ABC1234");
    }

    #[test]
    fn test_year_bounds() {
        let next_year = Utc::now().year() + 1;
        assert!(Vehicle::new(ClientId::new(), "BRA2E19", "VW", "Gol", 1900).is_ok());
        assert!(Vehicle::new(ClientId::new(), "BRA2E19", "VW", "Gol", next_year).is_ok());
        assert!(matches!(
            Vehicle::new(ClientId::new(), "BRA2E19", "VW", "Gol", 1899).unwrap_err(),
            VehicleError::InvalidYear { year: 1899, .. }
        ));
        assert!(Vehicle::new(ClientId::new(), "BRA2E19", "VW", "Gol", next_year + 1).is_err());
    }

    #[test]
    fn test_new_vehicle_validation() {
        assert_eq!(
            Vehicle::new(ClientId::nil(), "BRA2E19", "VW", "Gol", 2020).unwrap_err(),
            VehicleError::ClientIdRequired
        );
        assert_eq!(
            Vehicle::new(ClientId::new(), "BRA2E19", "", "Gol", 2020).unwrap_err(),
            VehicleError::BrandAndModelRequired
        );
        assert_eq!(
            Vehicle::new(ClientId::new(), "12-ABCD", "VW", "Gol", 2020).unwrap_err(),
            VehicleError::Validation(ValidationError::InvalidPlate)
        );
    }

    #[test]
    fn test_update_vehicle() {
        let mut v = Vehicle::new(ClientId::new(), "ABC1234", "Fiat", "Uno", 2010).unwrap();
        let owner = v.client_id;
        v.update("BRA2E19", "Fiat", "Argo", 2022).unwrap();
        assert_eq!(v.plate.as_str(), "BRA2E19");
        assert_eq!(v.model, "Argo");
        assert_eq!(v.client_id, owner);
    }
}

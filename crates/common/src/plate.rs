//! Brazilian vehicle license plates.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated plate in canonical form: uppercase, no dash.
///
/// Accepts both the legacy layout `AAA9999` and the Mercosul layout
/// `AAA9A99`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plate(String);

impl Plate {
    /// Parses a plate such as `abc-1234` or `BRA2E19`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let canonical: String = raw
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let bytes = canonical.as_bytes();
        if bytes.len() != 7 || !bytes[..3].iter().all(u8::is_ascii_uppercase) {
            return Err(ValidationError::InvalidPlate);
        }

        let tail = &bytes[3..];
        let legacy = tail.iter().all(u8::is_ascii_digit);
        let mercosul = tail[0].is_ascii_digit()
            && tail[1].is_ascii_uppercase()
            && tail[2..].iter().all(u8::is_ascii_digit);

        if legacy || mercosul {
            Ok(Self(canonical))
        } else {
            Err(ValidationError::InvalidPlate)
        }
    }

    /// Returns the canonical plate text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Plate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Plate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Plate> for String {
    fn from(plate: Plate) -> Self {
        plate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_plate_with_dash() {
        let plate = Plate::parse("abc-1234").unwrap();
        assert_eq!(plate.as_str(), "ABC1234");
    }

    #[test]
    fn accepts_mercosul_plate() {
        let plate = Plate::parse("BRA2E19").unwrap();
        assert_eq!(plate.as_str(), "BRA2E19");
    }

    #[test]
    fn rejects_malformed_plates() {
        for raw in ["", "AB1234", "ABCD123", "ABC12345", "1BC1234", "ABC1A2B", "ÁBC1234"] {
            assert_eq!(Plate::parse(raw), Err(ValidationError::InvalidPlate), "{raw}");
        }
    }
}

//! CPF / CNPJ taxpayer documents.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which registry a [`Document`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Company taxpayer (14 digits).
    Cnpj,
}

/// A validated CPF or CNPJ, stored as digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Document(String);

impl Document {
    /// Parses a document, ignoring punctuation such as `.`, `-` and `/`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let clean: String = raw.chars().filter(char::is_ascii_digit).collect();
        let digits: Vec<u32> = clean.bytes().map(|b| u32::from(b - b'0')).collect();

        let valid = match digits.len() {
            11 => is_valid_cpf(&digits),
            14 => is_valid_cnpj(&digits),
            _ => false,
        };
        if !valid {
            return Err(ValidationError::InvalidDocument);
        }

        Ok(Self(clean))
    }

    /// Returns the registry this document belongs to.
    pub fn kind(&self) -> DocumentKind {
        if self.0.len() == 11 {
            DocumentKind::Cpf
        } else {
            DocumentKind::Cnpj
        }
    }

    /// Returns the digits-only form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Document {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Document> for String {
    fn from(doc: Document) -> Self {
        doc.0
    }
}

fn check_digit(digits: &[u32], weights: impl Iterator<Item = u32>) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn is_valid_cpf(digits: &[u32]) -> bool {
    if all_equal(digits) {
        return false;
    }
    let first = check_digit(&digits[..9], (2..=10).rev());
    if digits[9] != first {
        return false;
    }
    check_digit(&digits[..10], (2..=11).rev()) == digits[10]
}

fn is_valid_cnpj(digits: &[u32]) -> bool {
    if all_equal(digits) {
        return false;
    }
    let first = check_digit(&digits[..12], CNPJ_FIRST_WEIGHTS.into_iter());
    if digits[12] != first {
        return false;
    }
    check_digit(&digits[..13], CNPJ_SECOND_WEIGHTS.into_iter()) == digits[13]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_formatted_cpf() {
        let doc = Document::parse("529.982.247-25").unwrap();
        assert_eq!(doc.as_str(), "52998224725");
        assert_eq!(doc.kind(), DocumentKind::Cpf);
    }

    #[test]
    fn accepts_formatted_cnpj() {
        let doc = Document::parse("11.222.333/0001-81").unwrap();
        assert_eq!(doc.as_str(), "11222333000181");
        assert_eq!(doc.kind(), DocumentKind::Cnpj);
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert_eq!(
            Document::parse("529.982.247-26"),
            Err(ValidationError::InvalidDocument)
        );
        assert_eq!(
            Document::parse("11.222.333/0001-82"),
            Err(ValidationError::InvalidDocument)
        );
    }

    #[test]
    fn rejects_repeated_digits() {
        assert!(Document::parse("111.111.111-11").is_err());
        assert!(Document::parse("00000000000000").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Document::parse("").is_err());
        assert!(Document::parse("1234567890").is_err());
        assert!(Document::parse("123456789012").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Document, _> = serde_json::from_str("\"52998224725\"");
        assert!(ok.is_ok());
        let bad: Result<Document, _> = serde_json::from_str("\"12345678900\"");
        assert!(bad.is_err());
    }
}

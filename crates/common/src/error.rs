use thiserror::Error;

/// Errors produced when parsing Brazilian registry values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value is not a valid CPF or CNPJ.
    #[error("invalid document format")]
    InvalidDocument,

    /// The value is not a valid legacy or Mercosul license plate.
    #[error("invalid plate format")]
    InvalidPlate,
}

//! HTTP route handlers.

pub mod auth;
pub mod clients;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod parts;
pub mod public;
pub mod reports;
pub mod services;
pub mod vehicles;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path or body id into its typed form.
pub(crate) fn parse_id<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = uuid::Error>,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what} ID format: {e}")))
}

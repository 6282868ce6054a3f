//! Shop clients.

use chrono::{DateTime, Utc};
use common::{ClientId, Document, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Client name is required")]
    NameRequired,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A person or company that brings vehicles to the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    /// CPF or CNPJ, digits only.
    pub document: Document,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(
        name: impl Into<String>,
        document: &str,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let name = required_name(name.into())?;
        let document = Document::parse(document)?;

        let now = Utc::now();
        Ok(Self {
            id: ClientId::new(),
            name,
            document,
            email: email.into(),
            phone: phone.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable fields, validating them like [`Client::new`].
    pub fn update(
        &mut self,
        name: impl Into<String>,
        document: &str,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<(), ClientError> {
        let name = required_name(name.into())?;
        self.document = Document::parse(document)?;
        self.name = name;
        self.email = email.into();
        self.phone = phone.into();
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn required_name(name: String) -> Result<String, ClientError> {
    if name.trim().is_empty() {
        Err(ClientError::NameRequired)
    } else {
        Ok(name)
    }
}

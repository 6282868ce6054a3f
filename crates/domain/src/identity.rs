//! Staff users and roles.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// Staff role. `Admin` passes every role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Returns true if this role may act where any of `allowed` is required.
    pub fn satisfies(&self, allowed: &[Role]) -> bool {
        *self == Role::Admin || allowed.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(IdentityError::UnknownRole(other.to_string())),
        }
    }
}

/// Argon2 hash in PHC string format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Hashes a plain-text password with a fresh salt.
    pub fn from_plain(password: &str) -> Result<Self, IdentityError> {
        if password.is_empty() {
            return Err(IdentityError::PasswordRequired);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| IdentityError::Hashing(e.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Wraps an existing hash read from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Checks a plain-text password. Unparseable hashes never verify.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: HashedPassword,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user, hashing the password.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        role: Role,
    ) -> Result<Self, IdentityError> {
        let email = email.into().trim().to_lowercase();
        if email.is_empty() {
            return Err(IdentityError::EmailRequired);
        }
        let password = HashedPassword::from_plain(password)?;

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name: name.into(),
            email,
            password,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }
}

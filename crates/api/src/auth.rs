//! JWT issuance and the bearer-token middleware guarding `/admin`.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use common::UserId;
use domain::{Role, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::error::ApiError;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed authorization header")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("Expected a {expected} token")]
    WrongTokenType { expected: &'static str },

    #[error("Invalid user ID in token")]
    InvalidSubject,

    #[error("Failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    pub role: Role,
    /// `access` or `refresh`.
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn new(user_id: UserId, role: Role, token_type: &str, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            role,
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidSubject)
    }
}

/// Access and refresh tokens handed out on login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Signs and verifies HS256 tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_token_expires_in: i64, refresh_token_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            refresh_token_expires_in,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        )
    }

    /// Issues a fresh access/refresh pair for a logged-in user.
    pub fn issue_for(&self, user: &User) -> Result<TokenPair, AuthError> {
        self.issue_pair(user.id, user.role)
    }

    pub fn issue_pair(&self, user_id: UserId, role: Role) -> Result<TokenPair, AuthError> {
        let access = Claims::new(user_id, role, ACCESS_TOKEN, self.access_token_expires_in);
        let refresh = Claims::new(user_id, role, REFRESH_TOKEN, self.refresh_token_expires_in);
        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            expires_in: self.access_token_expires_in,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, ACCESS_TOKEN)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token, REFRESH_TOKEN)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    fn verify(&self, token: &str, expected: &'static str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(AuthError::InvalidToken)?
            .claims;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType { expected });
        }
        claims.user_id()?;
        Ok(claims)
    }
}

/// Verified claims of the caller.
///
/// Only available behind [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    /// Fails with 403 unless the caller's role satisfies one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.0.role.satisfies(allowed) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.0.sub, role = %self.0.role, "insufficient permissions");
            Err(ApiError::Forbidden("insufficient permissions".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| ApiError::Unauthorized("user not authenticated".to_string()))
    }
}

/// Validates the bearer access token and stores its claims in the request
/// extensions.
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingCredentials)?;

    let claims = tokens.verify_access(token).inspect_err(|e| {
        tracing::warn!(error = %e, "token validation failed");
    })?;
    tracing::debug!(user_id = %claims.sub, role = %claims.role, "token validated");

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

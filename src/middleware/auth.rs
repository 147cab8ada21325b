use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role};

/// The caller, as asserted by a verified bearer token. Passed explicitly into every service call.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if !allowed.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_customer(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Customer])
}

pub fn ensure_employee(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Employee])
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, &[Role::Admin])
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        AppError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
        role: decoded.claims.role,
    })
}

/// Mint a token the extractor accepts; used by the seeder for local development.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    role: Role,
    ttl: Duration,
) -> anyhow::Result<String> {
    let exp = (Utc::now() + ttl).timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: usize::try_from(exp)?,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        let secret = jwt_secret()?;
        decode_token(token, &secret)
    }
}

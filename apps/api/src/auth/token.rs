use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repository::find_admin_by_id;
use crate::errors::AppError;
use crate::models::admin::AdminRow;
use crate::state::AppState;

pub const TOKEN_TTL_MINUTES: i64 = 60;
const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub admin_id: String,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn for_admin(admin_id: Uuid) -> Self {
        Self {
            admin_id: admin_id.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp(),
        }
    }
}

pub fn create_token(admin_id: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode_claims(&Claims::for_admin(admin_id), secret)
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn invalid_token() -> AppError {
    AppError::Unauthorized("Invalid token".to_string())
}

/// The admin behind a valid bearer token.
pub struct AuthAdmin(pub AdminRow);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or_else(invalid_token)?;
        let claims = decode_token(token, &state.config.jwt_secret).map_err(|_| invalid_token())?;
        let admin_id = Uuid::parse_str(&claims.admin_id).map_err(|_| invalid_token())?;

        let admin = find_admin_by_id(&state.db, admin_id)
            .await?
            .ok_or_else(invalid_token)?;
        Ok(AuthAdmin(admin))
    }
}

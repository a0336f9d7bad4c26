use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{request::Parts, StatusCode},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::models::user::ROLE_ADMIN;

const DEV_JWT_SECRET: &str = "retail-pos-dev-secret";
const TOKEN_LIFETIME_HOURS: i64 = 24;

static JWT_SECRET: Lazy<Option<String>> = Lazy::new(|| match env::var("JWT_SECRET") {
    Ok(secret) if !secret.is_empty() => Some(secret),
    _ if cfg!(debug_assertions) => {
        tracing::warn!("JWT_SECRET not set, using the development secret");
        Some(DEV_JWT_SECRET.to_string())
    }
    _ => None,
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub uid: i32,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Missing Authorization header" })),
            ))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Invalid Authorization header format" })),
        ))?;

        decode_jwt(token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Invalid or expired token" })),
            )
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn jwt_secret() -> Result<&'static str, String> {
    JWT_SECRET
        .as_deref()
        .ok_or_else(|| "JWT_SECRET environment variable must be set in production".to_string())
}

pub fn create_jwt(user_id: i32, username: &str, role: &str) -> Result<String, String> {
    let secret = jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or("Token expiration overflow")?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    let secret = jwt_secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("counter-pin").unwrap();
        assert_ne!(hash, "counter-pin");
        assert!(verify_password("counter-pin", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_jwt_carries_identity() {
        let token = create_jwt(7, "cashier", "staff").unwrap();
        let claims = decode_jwt(&token).unwrap();
        assert_eq!(claims.sub, "cashier");
        assert_eq!(claims.uid, 7);
        assert!(!claims.is_admin());
        assert!(claims.require_admin().is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = create_jwt(1, "admin", "admin").unwrap();
        let tampered = format!("{}x", token);
        assert!(decode_jwt(&tampered).is_err());
    }
}

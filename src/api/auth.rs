use axum::{extract::State, http::StatusCode, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{create_jwt, Claims};
use crate::domain::DomainError;
use crate::models::user::{UserDto, ROLE_ADMIN, ROLE_STAFF};
use crate::services::user_service;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    /// Only honoured when an admin registers the account
    role: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "JWT issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, DomainError> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = user_service::authenticate(&db, &payload.username, &payload.password).await?;
    let token = create_jwt(user.id, &user.username, &user.role).map_err(DomainError::Internal)?;

    Ok(Json(json!({
        "token": token,
        "user": UserDto::from(user)
    })))
}

/// The first account becomes admin without a token; afterwards only admins register users
pub async fn register(
    State(db): State<DatabaseConnection>,
    claims: Option<Claims>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let role = if user_service::count_users(&db).await? == 0 {
        tracing::info!("Bootstrapping first administrator '{}'", payload.username);
        ROLE_ADMIN.to_string()
    } else {
        let claims = claims.ok_or_else(|| {
            DomainError::Unauthorized("Missing Authorization header".to_string())
        })?;
        claims.require_admin()?;
        payload.role.unwrap_or_else(|| ROLE_STAFF.to_string())
    };

    let user = user_service::create_user(&db, &payload.username, &payload.password, &role).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": UserDto::from(user)
        })),
    ))
}

pub async fn me(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let user = user_service::get_user(&db, claims.uid).await?;
    Ok(Json(json!({ "user": UserDto::from(user) })))
}

pub async fn list_users(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let users: Vec<UserDto> = user_service::list_users(&db)
        .await?
        .into_iter()
        .map(UserDto::from)
        .collect();

    Ok(Json(json!({
        "users": users,
        "total": users.len()
    })))
}

//! User Service - staff accounts

use sea_orm::*;

use crate::auth::{hash_password, verify_password};
use crate::domain::DomainError;
use crate::models::user::{self, Entity as User, ROLE_ADMIN, ROLE_STAFF};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn count_users(db: &DatabaseConnection) -> Result<u64, DomainError> {
    Ok(User::find().count(db).await?)
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>, DomainError> {
    Ok(User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn get_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, DomainError> {
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>, DomainError> {
    Ok(User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?)
}

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> Result<user::Model, DomainError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::Validation("Username is required".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if role != ROLE_ADMIN && role != ROLE_STAFF {
        return Err(DomainError::Validation(format!("Unknown role '{}'", role)));
    }
    if find_by_username(db, username).await?.is_some() {
        return Err(DomainError::Conflict(format!(
            "Username {} is taken",
            username
        )));
    }

    let password_hash = hash_password(password).map_err(DomainError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_user.insert(db).await?;
    tracing::info!("Created {} account '{}'", saved.role, saved.username);
    Ok(saved)
}

/// Check credentials; unknown users and bad passwords are indistinguishable
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = find_by_username(db, username).await? else {
        tracing::warn!("Login attempt for unknown user: {}", username);
        return Err(invalid());
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", username);
            Err(invalid())
        }
        Err(e) => {
            tracing::error!("Stored hash for {} is unreadable: {}", username, e);
            Err(invalid())
        }
    }
}

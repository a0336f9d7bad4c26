use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::services::message_service;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: i32,
    pub subject: Option<String>,
    pub body: String,
}

/// GET /api/messages - inbox of the caller
pub async fn inbox(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let inbox = message_service::inbox(&db, claims.uid).await?;
    Ok(Json(json!({
        "messages": inbox.messages,
        "unread": inbox.unread,
        "total": inbox.messages.len()
    })))
}

pub async fn sent(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let messages = message_service::sent(&db, claims.uid).await?;
    Ok(Json(json!({
        "messages": messages,
        "total": messages.len()
    })))
}

pub async fn send(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let message = message_service::send_message(
        &db,
        claims.uid,
        payload.recipient_id,
        payload.subject,
        payload.body,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message
        })),
    ))
}

pub async fn mark_read(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let message = message_service::mark_read(&db, claims.uid, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": message
    })))
}

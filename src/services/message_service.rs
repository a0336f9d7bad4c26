//! Message Service - internal messaging between staff accounts

use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::message::{self, Entity as Message};
use crate::models::user::Entity as User;

/// Inbox listing with the unread count the UI badges
#[derive(Debug, Clone, Serialize)]
pub struct Inbox {
    pub messages: Vec<message::Model>,
    pub unread: usize,
}

pub async fn send_message(
    db: &DatabaseConnection,
    sender_id: i32,
    recipient_id: i32,
    subject: Option<String>,
    body: String,
) -> Result<message::Model, DomainError> {
    if body.trim().is_empty() {
        return Err(DomainError::Validation(
            "Message body cannot be empty".to_string(),
        ));
    }
    if sender_id == recipient_id {
        return Err(DomainError::Validation(
            "Cannot send a message to yourself".to_string(),
        ));
    }
    if User::find_by_id(recipient_id).one(db).await?.is_none() {
        return Err(DomainError::not_found("Recipient"));
    }

    let new_message = message::ActiveModel {
        sender_id: Set(sender_id),
        recipient_id: Set(recipient_id),
        subject: Set(subject.filter(|s| !s.trim().is_empty())),
        body: Set(body),
        read_at: Set(None),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let saved = new_message.insert(db).await?;
    tracing::debug!("Message {} sent from {} to {}", saved.id, sender_id, recipient_id);
    Ok(saved)
}

pub async fn inbox(db: &DatabaseConnection, user_id: i32) -> Result<Inbox, DomainError> {
    let messages = Message::find()
        .filter(message::Column::RecipientId.eq(user_id))
        .order_by_desc(message::Column::Id)
        .all(db)
        .await?;

    let unread = messages.iter().filter(|m| m.read_at.is_none()).count();
    Ok(Inbox { messages, unread })
}

pub async fn sent(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<message::Model>, DomainError> {
    Ok(Message::find()
        .filter(message::Column::SenderId.eq(user_id))
        .order_by_desc(message::Column::Id)
        .all(db)
        .await?)
}

/// Only the recipient may mark a message read; repeated calls keep the first timestamp
pub async fn mark_read(
    db: &DatabaseConnection,
    user_id: i32,
    message_id: i32,
) -> Result<message::Model, DomainError> {
    let existing = Message::find_by_id(message_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Message"))?;

    if existing.recipient_id != user_id {
        return Err(DomainError::Forbidden(
            "Only the recipient can mark a message as read".to_string(),
        ));
    }
    if existing.read_at.is_some() {
        return Ok(existing);
    }

    let mut active: message::ActiveModel = existing.into();
    active.read_at = Set(Some(chrono::Utc::now().to_rfc3339()));
    Ok(active.update(db).await?)
}

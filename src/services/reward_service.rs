//! Reward Service - catalog of rewards customers buy with points

use sea_orm::*;

use crate::domain::{DomainError, TransactionKind};
use crate::models::loyalty_reward::{self, Entity as Reward, RewardDto};
use crate::services::loyalty_service::{LoyaltyService, PointsOutcome};

fn validate(dto: &RewardDto) -> Result<(), DomainError> {
    if dto.name.trim().is_empty() {
        return Err(DomainError::Validation("Reward name is required".to_string()));
    }
    if dto.points_cost <= 0 {
        return Err(DomainError::Validation(
            "Reward cost must be a positive number of points".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_rewards(
    db: &DatabaseConnection,
    active_only: bool,
) -> Result<Vec<loyalty_reward::Model>, DomainError> {
    let mut query = Reward::find();
    if active_only {
        query = query.filter(loyalty_reward::Column::IsActive.eq(true));
    }
    Ok(query
        .order_by_asc(loyalty_reward::Column::PointsCost)
        .all(db)
        .await?)
}

pub async fn get_reward(
    db: &DatabaseConnection,
    id: i32,
) -> Result<loyalty_reward::Model, DomainError> {
    Reward::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Reward"))
}

pub async fn create_reward(
    db: &DatabaseConnection,
    dto: RewardDto,
) -> Result<loyalty_reward::Model, DomainError> {
    validate(&dto)?;
    let now = chrono::Utc::now().to_rfc3339();

    let new_reward = loyalty_reward::ActiveModel {
        name: Set(dto.name.trim().to_string()),
        description: Set(dto.description),
        points_cost: Set(dto.points_cost),
        is_active: Set(dto.is_active.unwrap_or(true)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_reward.insert(db).await?)
}

pub async fn update_reward(
    db: &DatabaseConnection,
    id: i32,
    dto: RewardDto,
) -> Result<loyalty_reward::Model, DomainError> {
    validate(&dto)?;
    let existing = get_reward(db, id).await?;
    let is_active = dto.is_active.unwrap_or(existing.is_active);

    let mut active: loyalty_reward::ActiveModel = existing.into();
    active.name = Set(dto.name.trim().to_string());
    active.description = Set(dto.description);
    active.points_cost = Set(dto.points_cost);
    active.is_active = Set(is_active);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

pub async fn delete_reward(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = Reward::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Reward"));
    }
    Ok(())
}

/// Spend an account's points on an active reward
pub async fn redeem_reward(
    db: &DatabaseConnection,
    loyalty: &LoyaltyService,
    account_id: i32,
    reward_id: i32,
) -> Result<PointsOutcome, DomainError> {
    let reward = get_reward(db, reward_id).await?;
    if !reward.is_active {
        return Err(DomainError::InvalidState(format!(
            "Reward '{}' is not available",
            reward.name
        )));
    }

    let outcome = loyalty
        .apply_points(
            account_id,
            TransactionKind::Redeem,
            reward.points_cost,
            Some(format!("reward:{}", reward.id)),
            Some(reward.name.clone()),
        )
        .await?;

    tracing::info!(
        "Account {} redeemed '{}' for {} points",
        account_id,
        reward.name,
        reward.points_cost
    );
    Ok(outcome)
}

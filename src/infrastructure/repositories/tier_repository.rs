//! SeaORM implementation of LoyaltyTierRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::{DomainError, LoyaltyTierRepository, Tier, TierInput};
use crate::models::loyalty_tier::{ActiveModel, Column, Entity as TierEntity};

/// SeaORM-based implementation of LoyaltyTierRepository
pub struct SeaOrmTierRepository {
    db: DatabaseConnection,
}

impl SeaOrmTierRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoyaltyTierRepository for SeaOrmTierRepository {
    async fn find_all_sorted(&self) -> Result<Vec<Tier>, DomainError> {
        let tiers = TierEntity::find()
            .order_by_asc(Column::MinPoints)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(tiers.into_iter().map(Tier::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tier>, DomainError> {
        let tier = TierEntity::find_by_id(id).one(&self.db).await?;
        Ok(tier.map(Tier::from))
    }

    async fn create(&self, input: TierInput) -> Result<Tier, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_tier = ActiveModel {
            name: Set(input.name.trim().to_string()),
            min_points: Set(input.min_points),
            max_points: Set(input.max_points),
            description: Set(input.description),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_tier.insert(&self.db).await?;
        Ok(Tier::from(result))
    }

    async fn update(&self, id: i32, input: TierInput) -> Result<Tier, DomainError> {
        let existing = TierEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Tier"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.min_points = Set(input.min_points);
        active.max_points = Set(input.max_points);
        active.description = Set(input.description);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Tier::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = TierEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Tier"));
        }

        Ok(())
    }
}

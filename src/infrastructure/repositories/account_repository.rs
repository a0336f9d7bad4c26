//! SeaORM implementation of LoyaltyAccountRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{
    DomainError, LoyaltyAccount, LoyaltyAccountRepository, NewPointsTransaction,
    PointsTransaction, TransactionKind,
};
use crate::models::loyalty_account::{self, Entity as AccountEntity};
use crate::models::loyalty_transaction::{self, Entity as TransactionEntity};

/// SeaORM-based implementation of LoyaltyAccountRepository
pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_points_transaction(model: loyalty_transaction::Model) -> Result<PointsTransaction, DomainError> {
    let kind = TransactionKind::parse(&model.kind).ok_or_else(|| {
        DomainError::Internal(format!("Unknown transaction kind '{}'", model.kind))
    })?;

    Ok(PointsTransaction {
        id: model.id,
        account_id: model.account_id,
        kind,
        points: model.points,
        balance_after: model.balance_after,
        reference: model.reference,
        note: model.note,
        created_at: model.created_at,
    })
}

#[async_trait]
impl LoyaltyAccountRepository for SeaOrmAccountRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<LoyaltyAccount>, DomainError> {
        let account = AccountEntity::find_by_id(id).one(&self.db).await?;
        Ok(account.map(LoyaltyAccount::from))
    }

    async fn find_by_customer(
        &self,
        customer_id: i32,
    ) -> Result<Option<LoyaltyAccount>, DomainError> {
        let account = AccountEntity::find()
            .filter(loyalty_account::Column::CustomerId.eq(customer_id))
            .one(&self.db)
            .await?;
        Ok(account.map(LoyaltyAccount::from))
    }

    async fn find_all(&self) -> Result<Vec<LoyaltyAccount>, DomainError> {
        let accounts = AccountEntity::find()
            .order_by_asc(loyalty_account::Column::Id)
            .all(&self.db)
            .await?;
        Ok(accounts.into_iter().map(LoyaltyAccount::from).collect())
    }

    async fn create(
        &self,
        customer_id: i32,
        card_number: String,
    ) -> Result<LoyaltyAccount, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_account = loyalty_account::ActiveModel {
            customer_id: Set(customer_id),
            card_number: Set(card_number),
            points_balance: Set(0),
            lifetime_points: Set(0),
            tier_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_account.insert(&self.db).await?;
        Ok(LoyaltyAccount::from(result))
    }

    async fn apply_transaction(
        &self,
        input: NewPointsTransaction,
    ) -> Result<(LoyaltyAccount, PointsTransaction), DomainError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.db.begin().await?;

        let account = AccountEntity::find_by_id(input.account_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Loyalty account"))?;

        let out_of_range = || DomainError::Validation("Points out of range".to_string());
        let balance_after = account
            .points_balance
            .checked_add(input.points)
            .ok_or_else(out_of_range)?;
        if balance_after < 0 {
            return Err(DomainError::InvalidState(
                "Points balance cannot become negative".to_string(),
            ));
        }

        let lifetime_points = if input.kind == TransactionKind::Earn {
            account
                .lifetime_points
                .checked_add(input.points)
                .ok_or_else(out_of_range)?
        } else {
            account.lifetime_points
        };

        let mut active: loyalty_account::ActiveModel = account.into();
        active.points_balance = Set(balance_after);
        active.lifetime_points = Set(lifetime_points);
        active.updated_at = Set(now.clone());
        let updated = active.update(&txn).await?;

        let record = loyalty_transaction::ActiveModel {
            account_id: Set(input.account_id),
            kind: Set(input.kind.as_str().to_string()),
            points: Set(input.points),
            balance_after: Set(balance_after),
            reference: Set(input.reference),
            note: Set(input.note),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok((LoyaltyAccount::from(updated), to_points_transaction(record)?))
    }

    async fn set_tier(&self, account_id: i32, tier_id: Option<i32>) -> Result<(), DomainError> {
        let account = AccountEntity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Loyalty account"))?;

        let mut active: loyalty_account::ActiveModel = account.into();
        active.tier_id = Set(tier_id);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn list_transactions(
        &self,
        account_id: i32,
    ) -> Result<Vec<PointsTransaction>, DomainError> {
        let records = TransactionEntity::find()
            .filter(loyalty_transaction::Column::AccountId.eq(account_id))
            .order_by_desc(loyalty_transaction::Column::Id)
            .all(&self.db)
            .await?;

        records.into_iter().map(to_points_transaction).collect()
    }
}

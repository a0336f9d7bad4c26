//! Repository trait definitions
//!
//! These traits define the contract for loyalty data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::loyalty::{Tier, TransactionKind};
use super::DomainError;

/// Input for creating or replacing a tier
#[derive(Debug, Clone, Deserialize)]
pub struct TierInput {
    pub name: String,
    pub min_points: i64,
    pub max_points: Option<i64>,
    pub description: Option<String>,
}

/// Loyalty account data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub id: i32,
    pub customer_id: i32,
    pub card_number: String,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub tier_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

/// A recorded points movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransaction {
    pub id: i32,
    pub account_id: i32,
    pub kind: TransactionKind,
    pub points: i64,
    pub balance_after: i64,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
}

/// A points movement to be written
#[derive(Debug, Clone)]
pub struct NewPointsTransaction {
    pub account_id: i32,
    pub kind: TransactionKind,
    /// Signed delta, already checked against the balance
    pub points: i64,
    pub reference: Option<String>,
    pub note: Option<String>,
}

/// Repository trait for LoyaltyTier entity
#[async_trait]
pub trait LoyaltyTierRepository: Send + Sync {
    /// All tiers sorted ascending by `min_points`
    async fn find_all_sorted(&self) -> Result<Vec<Tier>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Tier>, DomainError>;

    async fn create(&self, input: TierInput) -> Result<Tier, DomainError>;

    async fn update(&self, id: i32, input: TierInput) -> Result<Tier, DomainError>;

    /// Delete a tier; accounts pointing at it lose their tier reference
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for LoyaltyAccount entity and its transactions
#[async_trait]
pub trait LoyaltyAccountRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<LoyaltyAccount>, DomainError>;

    async fn find_by_customer(
        &self,
        customer_id: i32,
    ) -> Result<Option<LoyaltyAccount>, DomainError>;

    async fn find_all(&self) -> Result<Vec<LoyaltyAccount>, DomainError>;

    /// Create an empty account for a customer
    async fn create(
        &self,
        customer_id: i32,
        card_number: String,
    ) -> Result<LoyaltyAccount, DomainError>;

    /// Record a transaction and move the balance in one unit of work
    async fn apply_transaction(
        &self,
        txn: NewPointsTransaction,
    ) -> Result<(LoyaltyAccount, PointsTransaction), DomainError>;

    /// Persist a new tier reference
    async fn set_tier(&self, account_id: i32, tier_id: Option<i32>) -> Result<(), DomainError>;

    /// Transactions for an account, newest first
    async fn list_transactions(
        &self,
        account_id: i32,
    ) -> Result<Vec<PointsTransaction>, DomainError>;
}

//! Loyalty Service - tier assignment, points movements and account lifecycle
//!
//! Works only through the repository traits so the tier rule can be
//! exercised without a database.

use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::loyalty::{self, points_delta, points_for_amount, validate_tier_bounds};
use crate::domain::{
    DomainError, LoyaltyAccount, LoyaltyAccountRepository, LoyaltyTierRepository,
    NewPointsTransaction, PointsTransaction, Tier, TierInput, TransactionKind, NO_TIER,
};

const CARD_NUMBER_DIGITS: usize = 12;
const CARD_NUMBER_ATTEMPTS: usize = 5;

/// Outcome of resolving an account's tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAssignment {
    pub tier_id: Option<i32>,
    pub tier_name: String,
    /// Whether the stored tier reference was rewritten
    pub changed: bool,
}

/// The next band up and how far away it is
#[derive(Debug, Clone, Serialize)]
pub struct NextTier {
    pub name: String,
    pub points_needed: i64,
}

/// Account with its resolved tier, for API responses
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    #[serde(flatten)]
    pub account: LoyaltyAccount,
    pub tier_name: String,
    pub next_tier: Option<NextTier>,
}

/// Result of a points movement
#[derive(Debug, Clone, Serialize)]
pub struct PointsOutcome {
    pub account: LoyaltyAccount,
    pub transaction: PointsTransaction,
    pub tier: TierAssignment,
}

#[derive(Clone)]
pub struct LoyaltyService {
    tiers: Arc<dyn LoyaltyTierRepository>,
    accounts: Arc<dyn LoyaltyAccountRepository>,
}

fn generate_card_number() -> String {
    let mut rng = rand::thread_rng();
    let mut digits = String::with_capacity(CARD_NUMBER_DIGITS);
    digits.push(char::from(b'1' + rng.gen_range(0..9u8)));
    for _ in 1..CARD_NUMBER_DIGITS {
        digits.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    digits
}

fn next_tier(balance: i64, tiers: &[Tier]) -> Option<NextTier> {
    tiers
        .iter()
        .find(|tier| tier.min_points > balance)
        .map(|tier| NextTier {
            name: tier.name.clone(),
            points_needed: tier.min_points - balance,
        })
}

impl LoyaltyService {
    pub fn new(
        tiers: Arc<dyn LoyaltyTierRepository>,
        accounts: Arc<dyn LoyaltyAccountRepository>,
    ) -> Self {
        Self { tiers, accounts }
    }

    // ---- Tiers ----

    pub async fn list_tiers(&self) -> Result<Vec<Tier>, DomainError> {
        self.tiers.find_all_sorted().await
    }

    pub async fn create_tier(&self, input: TierInput) -> Result<Tier, DomainError> {
        validate_tier_bounds(&input.name, input.min_points, input.max_points)
            .map_err(DomainError::Validation)?;
        let tier = self.tiers.create(input).await?;
        tracing::info!(
            "Created loyalty tier '{}' [{}, {:?}]",
            tier.name,
            tier.min_points,
            tier.max_points
        );
        Ok(tier)
    }

    pub async fn update_tier(&self, id: i32, input: TierInput) -> Result<Tier, DomainError> {
        validate_tier_bounds(&input.name, input.min_points, input.max_points)
            .map_err(DomainError::Validation)?;
        self.tiers.update(id, input).await
    }

    pub async fn delete_tier(&self, id: i32) -> Result<(), DomainError> {
        self.tiers.delete(id).await
    }

    /// Tier name for an arbitrary balance, or the "No Tier" label
    pub async fn resolve_name(&self, points: i64) -> Result<String, DomainError> {
        let tiers = self.tiers.find_all_sorted().await?;
        Ok(loyalty::tier_name(points, &tiers).to_string())
    }

    // ---- Tier assignment ----

    async fn assign(
        &self,
        account: &LoyaltyAccount,
        tiers: &[Tier],
    ) -> Result<TierAssignment, DomainError> {
        let resolved = loyalty::resolve_tier(account.points_balance, tiers);
        let tier_id = resolved.map(|tier| tier.id);
        let tier_name = resolved
            .map(|tier| tier.name.clone())
            .unwrap_or_else(|| NO_TIER.to_string());

        let changed = tier_id != account.tier_id;
        if changed {
            self.accounts.set_tier(account.id, tier_id).await?;
            tracing::info!(
                "Loyalty account {} moved to tier '{}' (balance {})",
                account.id,
                tier_name,
                account.points_balance
            );
        }

        Ok(TierAssignment {
            tier_id,
            tier_name,
            changed,
        })
    }

    /// Resolve the account's tier and persist it only when it differs
    pub async fn refresh_tier(&self, account_id: i32) -> Result<TierAssignment, DomainError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Loyalty account"))?;
        let tiers = self.tiers.find_all_sorted().await?;
        self.assign(&account, &tiers).await
    }

    /// Re-run tier assignment on every account, returns how many changed
    pub async fn recalculate_all(&self) -> Result<usize, DomainError> {
        let tiers = self.tiers.find_all_sorted().await?;
        let accounts = self.accounts.find_all().await?;

        let mut changed = 0;
        for account in &accounts {
            if self.assign(account, &tiers).await?.changed {
                changed += 1;
            }
        }

        tracing::info!(
            "Recalculated tiers for {} accounts, {} changed",
            accounts.len(),
            changed
        );
        Ok(changed)
    }

    // ---- Accounts ----

    /// Open an account for a customer that does not have one yet
    pub async fn open_account(&self, customer_id: i32) -> Result<LoyaltyAccount, DomainError> {
        let already_enrolled = || {
            DomainError::Conflict(format!(
                "Customer {} already has a loyalty account",
                customer_id
            ))
        };
        if self.accounts.find_by_customer(customer_id).await?.is_some() {
            return Err(already_enrolled());
        }

        // Card numbers are random; a clash with an existing card is retried
        let mut attempt = 1;
        let mut account = loop {
            match self
                .accounts
                .create(customer_id, generate_card_number())
                .await
            {
                Ok(account) => break account,
                Err(DomainError::Conflict(detail)) => {
                    if self.accounts.find_by_customer(customer_id).await?.is_some() {
                        return Err(already_enrolled());
                    }
                    if attempt >= CARD_NUMBER_ATTEMPTS {
                        return Err(DomainError::Internal(format!(
                            "No free card number after {} attempts: {}",
                            attempt, detail
                        )));
                    }
                    tracing::warn!(
                        "Card number clash for customer {} (attempt {}), retrying",
                        customer_id,
                        attempt
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        // A tier starting at zero applies straight away
        let tiers = self.tiers.find_all_sorted().await?;
        let assignment = self.assign(&account, &tiers).await?;
        account.tier_id = assignment.tier_id;

        tracing::info!(
            "Opened loyalty account {} for customer {}",
            account.id,
            customer_id
        );
        Ok(account)
    }

    async fn account_for_customer(
        &self,
        customer_id: i32,
    ) -> Result<LoyaltyAccount, DomainError> {
        match self.accounts.find_by_customer(customer_id).await? {
            Some(account) => Ok(account),
            None => self.open_account(customer_id).await,
        }
    }

    pub async fn find_account(&self, account_id: i32) -> Result<LoyaltyAccount, DomainError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Loyalty account"))
    }

    pub async fn find_by_customer(
        &self,
        customer_id: i32,
    ) -> Result<Option<LoyaltyAccount>, DomainError> {
        self.accounts.find_by_customer(customer_id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<LoyaltyAccount>, DomainError> {
        self.accounts.find_all().await
    }

    pub async fn summarize(&self, account: LoyaltyAccount) -> Result<AccountSummary, DomainError> {
        let tiers = self.tiers.find_all_sorted().await?;
        let tier_name = loyalty::tier_name(account.points_balance, &tiers).to_string();
        let next_tier = next_tier(account.points_balance, &tiers);
        Ok(AccountSummary {
            account,
            tier_name,
            next_tier,
        })
    }

    pub async fn transactions(
        &self,
        account_id: i32,
    ) -> Result<Vec<PointsTransaction>, DomainError> {
        self.find_account(account_id).await?;
        self.accounts.list_transactions(account_id).await
    }

    // ---- Points ----

    /// Record a points movement then re-evaluate the tier
    pub async fn apply_points(
        &self,
        account_id: i32,
        kind: TransactionKind,
        points: i64,
        reference: Option<String>,
        note: Option<String>,
    ) -> Result<PointsOutcome, DomainError> {
        let account = self.find_account(account_id).await?;
        let delta = points_delta(kind, points, account.points_balance)?;

        let (account, transaction) = self
            .accounts
            .apply_transaction(NewPointsTransaction {
                account_id,
                kind,
                points: delta,
                reference,
                note,
            })
            .await?;

        let tiers = self.tiers.find_all_sorted().await?;
        let tier = self.assign(&account, &tiers).await?;

        let mut account = account;
        account.tier_id = tier.tier_id;

        tracing::debug!(
            "Account {}: {} {} points, balance now {}",
            account_id,
            kind.as_str(),
            delta,
            account.points_balance
        );

        Ok(PointsOutcome {
            account,
            transaction,
            tier,
        })
    }

    /// Award points for a completed order, opening the account on first purchase
    pub async fn earn_for_order(
        &self,
        customer_id: i32,
        order_id: i32,
        order_total: f64,
        points_per_unit: f64,
    ) -> Result<Option<PointsOutcome>, DomainError> {
        let points = points_for_amount(order_total, points_per_unit);
        if points == 0 {
            return Ok(None);
        }

        let account = self.account_for_customer(customer_id).await?;
        let outcome = self
            .apply_points(
                account.id,
                TransactionKind::Earn,
                points,
                Some(format!("order:{}", order_id)),
                None,
            )
            .await?;
        Ok(Some(outcome))
    }

    /// Take back points earned by a cancelled order, never below zero
    pub async fn reverse_order(
        &self,
        customer_id: i32,
        order_id: i32,
        points_earned: i64,
    ) -> Result<Option<PointsOutcome>, DomainError> {
        if points_earned <= 0 {
            return Ok(None);
        }
        let Some(account) = self.accounts.find_by_customer(customer_id).await? else {
            return Ok(None);
        };
        if account.points_balance == 0 {
            tracing::warn!(
                "Order {} cancelled but account {} has no points left to reverse",
                order_id,
                account.id
            );
            return Ok(None);
        }

        let outcome = self
            .apply_points(
                account.id,
                TransactionKind::Reversal,
                points_earned,
                Some(format!("order:{}", order_id)),
                Some("Order cancelled".to_string()),
            )
            .await?;
        Ok(Some(outcome))
    }
}

//! Dashboard Service - headline numbers for the admin screen

use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::loyalty::tier_name;
use crate::domain::DomainError;
use crate::services::loyalty_service::LoyaltyService;
use crate::services::order_service::round_cents;
use crate::services::{customer_service, order_service, product_service};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub completed_orders: u64,
    pub revenue: f64,
    pub average_order_value: f64,
    pub active_customers: u64,
    pub kyc_awaiting_review: u64,
    pub low_stock_products: usize,
    pub loyalty_accounts: usize,
    /// Accounts per tier name, "No Tier" included
    pub tier_distribution: BTreeMap<String, usize>,
}

pub async fn summary(
    db: &DatabaseConnection,
    loyalty: &LoyaltyService,
) -> Result<DashboardSummary, DomainError> {
    let (completed_orders, revenue) = order_service::sales_totals(db).await?;
    let average_order_value = if completed_orders == 0 {
        0.0
    } else {
        round_cents(revenue / completed_orders as f64)
    };

    let tiers = loyalty.list_tiers().await?;
    let accounts = loyalty.list_accounts().await?;
    let mut tier_distribution = BTreeMap::new();
    for account in &accounts {
        *tier_distribution
            .entry(tier_name(account.points_balance, &tiers).to_string())
            .or_insert(0) += 1;
    }

    Ok(DashboardSummary {
        completed_orders,
        revenue,
        average_order_value,
        active_customers: customer_service::count_active(db).await?,
        kyc_awaiting_review: customer_service::count_awaiting_review(db).await?,
        low_stock_products: product_service::low_stock(db).await?.len(),
        loyalty_accounts: accounts.len(),
        tier_distribution,
    })
}

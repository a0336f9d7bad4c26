//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{LoyaltyAccountRepository, LoyaltyTierRepository};
use crate::infrastructure::config::StoreSettings;
use crate::infrastructure::{SeaOrmAccountRepository, SeaOrmTierRepository};
use crate::services::loyalty_service::LoyaltyService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Tax and loyalty earning rates
    pub settings: StoreSettings,
    pub tier_repo: Arc<dyn LoyaltyTierRepository>,
    pub account_repo: Arc<dyn LoyaltyAccountRepository>,
}

impl AppState {
    /// Create a new AppState with default store settings
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_settings(db, StoreSettings::default())
    }

    pub fn with_settings(db: DatabaseConnection, settings: StoreSettings) -> Self {
        let tier_repo = Arc::new(SeaOrmTierRepository::new(db.clone()));
        let account_repo = Arc::new(SeaOrmAccountRepository::new(db.clone()));

        Self {
            db,
            settings,
            tier_repo,
            account_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Loyalty service bound to this state's repositories
    pub fn loyalty(&self) -> LoyaltyService {
        LoyaltyService::new(self.tier_repo.clone(), self.account_repo.clone())
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

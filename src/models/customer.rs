use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub kyc_status: String, // 'pending', 'submitted', 'verified', 'rejected'
    pub kyc_document_type: Option<String>,
    pub kyc_document_number: Option<String>,
    pub kyc_reviewed_at: Option<String>,
    pub kyc_rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
    #[sea_orm(has_one = "super::loyalty_account::Entity")]
    LoyaltyAccount,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::loyalty_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const KYC_PENDING: &str = "pending";
pub const KYC_SUBMITTED: &str = "submitted";
pub const KYC_VERIFIED: &str = "verified";
pub const KYC_REJECTED: &str = "rejected";

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_kyc_verified(&self) -> bool {
        self.kyc_status == KYC_VERIFIED
    }
}

// DTO for API input
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerDto {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

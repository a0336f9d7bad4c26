use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub customer_id: i32,
    #[sea_orm(unique)]
    pub card_number: String,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub tier_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::loyalty_tier::Entity",
        from = "Column::TierId",
        to = "super::loyalty_tier::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    LoyaltyTier,
    #[sea_orm(has_many = "super::loyalty_transaction::Entity")]
    LoyaltyTransaction,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::loyalty_tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyTier.def()
    }
}

impl Related<super::loyalty_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::LoyaltyAccount {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            card_number: model.card_number,
            points_balance: model.points_balance,
            lifetime_points: model.lifetime_points,
            tier_id: model.tier_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

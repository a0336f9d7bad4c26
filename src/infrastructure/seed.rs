use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::auth::hash_password;
use crate::domain::DomainError;
use crate::models::user::{ROLE_ADMIN, ROLE_STAFF};
use crate::models::{loyalty_reward, loyalty_tier, product, user};

/// Demo data for local runs (`SEED_DEMO=1`). Safe to run more than once.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DomainError> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Users
    for (username, password, role) in [
        ("admin", "admin1234", ROLE_ADMIN),
        ("cashier", "cashier1234", ROLE_STAFF),
    ] {
        let account = user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(hash_password(password).map_err(DomainError::Internal)?),
            role: Set(role.to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        user::Entity::insert(account)
            .on_conflict(
                OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 2. Tier ladder, only on an empty table so edited tiers are left alone
    if loyalty_tier::Entity::find().count(db).await? == 0 {
        for (name, min, max) in [
            ("Bronze", 0, Some(999)),
            ("Silver", 1000, Some(4999)),
            ("Gold", 5000, None),
        ] {
            loyalty_tier::ActiveModel {
                name: Set(name.to_owned()),
                min_points: Set(min),
                max_points: Set(max),
                description: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    // 3. Catalog
    let products = [
        ("COF-250", "House Blend Coffee 250g", "Grocery", 7.5, 40),
        ("MUG-001", "Ceramic Mug", "Homeware", 9.0, 12),
        ("TEA-100", "Green Tea 100 bags", "Grocery", 5.25, 3),
    ];
    for (sku, name, category, price, stock) in products {
        let item = product::ActiveModel {
            sku: Set(sku.to_owned()),
            name: Set(name.to_owned()),
            description: Set(None),
            category: Set(Some(category.to_owned())),
            price: Set(price),
            stock_quantity: Set(stock),
            low_stock_threshold: Set(5),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        product::Entity::insert(item)
            .on_conflict(OnConflict::column(product::Column::Sku).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }

    // 4. Rewards
    if loyalty_reward::Entity::find().count(db).await? == 0 {
        for (name, cost) in [("Free coffee", 150), ("10% voucher", 500)] {
            loyalty_reward::ActiveModel {
                name: Set(name.to_owned()),
                description: Set(None),
                points_cost: Set(cost),
                is_active: Set(true),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}

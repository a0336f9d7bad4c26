//! Product Service - catalog and stock levels

use sea_orm::*;

use crate::domain::DomainError;
use crate::models::product::{self, Entity as Product, ProductDto};

const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Filter parameters for listing products
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    /// Matches name or SKU
    pub q: Option<String>,
    pub active: Option<bool>,
}

fn validate(dto: &ProductDto) -> Result<(), DomainError> {
    if dto.sku.trim().is_empty() || dto.name.trim().is_empty() {
        return Err(DomainError::Validation(
            "SKU and name are required".to_string(),
        ));
    }
    if !dto.price.is_finite() || dto.price < 0.0 {
        return Err(DomainError::Validation(
            "Price must be zero or positive".to_string(),
        ));
    }
    if dto.stock_quantity < 0 {
        return Err(DomainError::Validation(
            "Stock quantity cannot be negative".to_string(),
        ));
    }
    if dto.low_stock_threshold.is_some_and(|t| t < 0) {
        return Err(DomainError::Validation(
            "Low stock threshold cannot be negative".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_sku_free(
    db: &DatabaseConnection,
    sku: &str,
    exclude_id: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = Product::find().filter(product::Column::Sku.eq(sku));
    if let Some(id) = exclude_id {
        query = query.filter(product::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(DomainError::Conflict(format!("SKU {} already exists", sku)));
    }
    Ok(())
}

pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<Vec<product::Model>, DomainError> {
    let mut condition = Condition::all();

    if let Some(category) = filter.category {
        condition = condition.add(product::Column::Category.eq(category));
    }
    if let Some(active) = filter.active {
        condition = condition.add(product::Column::IsActive.eq(active));
    }
    if let Some(q) = filter.q.filter(|q| !q.trim().is_empty()) {
        let q = q.trim().to_string();
        condition = condition.add(
            Condition::any()
                .add(product::Column::Name.contains(&q))
                .add(product::Column::Sku.contains(&q)),
        );
    }

    Ok(Product::find()
        .filter(condition)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_product(db: &DatabaseConnection, id: i32) -> Result<product::Model, DomainError> {
    Product::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Product"))
}

pub async fn create_product(
    db: &DatabaseConnection,
    dto: ProductDto,
) -> Result<product::Model, DomainError> {
    validate(&dto)?;
    let sku = dto.sku.trim().to_uppercase();
    ensure_sku_free(db, &sku, None).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let new_product = product::ActiveModel {
        sku: Set(sku),
        name: Set(dto.name.trim().to_string()),
        description: Set(dto.description),
        category: Set(dto.category),
        price: Set(dto.price),
        stock_quantity: Set(dto.stock_quantity),
        low_stock_threshold: Set(dto
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)),
        is_active: Set(dto.is_active.unwrap_or(true)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_product.insert(db).await?;
    tracing::info!("Added product {} ({})", saved.sku, saved.name);
    Ok(saved)
}

/// Replace catalog fields; stock moves go through `adjust_stock`
pub async fn update_product(
    db: &DatabaseConnection,
    id: i32,
    dto: ProductDto,
) -> Result<product::Model, DomainError> {
    validate(&dto)?;
    let existing = get_product(db, id).await?;
    let sku = dto.sku.trim().to_uppercase();
    ensure_sku_free(db, &sku, Some(id)).await?;

    let mut active: product::ActiveModel = existing.clone().into();
    active.sku = Set(sku);
    active.name = Set(dto.name.trim().to_string());
    active.description = Set(dto.description);
    active.category = Set(dto.category);
    active.price = Set(dto.price);
    active.low_stock_threshold = Set(dto
        .low_stock_threshold
        .unwrap_or(existing.low_stock_threshold));
    active.is_active = Set(dto.is_active.unwrap_or(existing.is_active));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Products are retired rather than removed so order lines stay valid
pub async fn deactivate_product(
    db: &DatabaseConnection,
    id: i32,
) -> Result<product::Model, DomainError> {
    let existing = get_product(db, id).await?;
    let mut active: product::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Restock or write off units
pub async fn adjust_stock(
    db: &DatabaseConnection,
    id: i32,
    delta: i32,
    reason: Option<String>,
) -> Result<product::Model, DomainError> {
    if delta == 0 {
        return Err(DomainError::Validation(
            "Stock adjustment cannot be zero".to_string(),
        ));
    }

    let existing = get_product(db, id).await?;
    let new_quantity = existing.stock_quantity.checked_add(delta).ok_or_else(|| {
        DomainError::Validation("Stock adjustment is out of range".to_string())
    })?;
    if new_quantity < 0 {
        return Err(DomainError::InvalidState(format!(
            "Only {} units of {} in stock",
            existing.stock_quantity, existing.sku
        )));
    }

    let mut active: product::ActiveModel = existing.into();
    active.stock_quantity = Set(new_quantity);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let saved = active.update(db).await?;

    tracing::info!(
        "Stock for {} adjusted by {} to {} ({})",
        saved.sku,
        delta,
        saved.stock_quantity,
        reason.as_deref().unwrap_or("no reason given")
    );
    Ok(saved)
}

/// Active products at or below their reorder threshold
pub async fn low_stock(db: &DatabaseConnection) -> Result<Vec<product::Model>, DomainError> {
    let products = Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::StockQuantity)
        .all(db)
        .await?;

    Ok(products.into_iter().filter(|p| p.is_low_stock()).collect())
}

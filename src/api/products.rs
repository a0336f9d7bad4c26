use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::models::product::ProductDto;
use crate::services::product_service::{self, ProductFilter};

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i32,
    pub reason: Option<String>,
}

/// GET /api/products
pub async fn list_products(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Query(params): Query<ProductsQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = ProductFilter {
        category: params.category,
        q: params.q,
        active: params.active,
    };
    let products = product_service::list_products(&db, filter).await?;
    Ok(Json(json!({
        "products": products,
        "total": products.len()
    })))
}

/// POST /api/products
pub async fn create_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<ProductDto>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    claims.require_admin()?;
    let product = product_service::create_product(&db, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "product": product
        })),
    ))
}

/// GET /api/products/:id
pub async fn get_product(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let product = product_service::get_product(&db, id).await?;
    Ok(Json(json!({ "product": product })))
}

/// PUT /api/products/:id
pub async fn update_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<ProductDto>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let product = product_service::update_product(&db, id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "product": product
    })))
}

/// DELETE /api/products/:id - retire from the catalog
pub async fn delete_product(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    product_service::deactivate_product(&db, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Product deactivated"
    })))
}

/// POST /api/products/:id/stock
pub async fn adjust_stock(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<StockAdjustment>,
) -> Result<Json<Value>, DomainError> {
    let product = product_service::adjust_stock(&db, id, payload.delta, payload.reason).await?;
    Ok(Json(json!({
        "success": true,
        "product": product
    })))
}

/// GET /api/products/low-stock
pub async fn low_stock(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let products = product_service::low_stock(&db).await?;
    Ok(Json(json!({
        "products": products,
        "total": products.len()
    })))
}

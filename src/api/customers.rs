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
use crate::infrastructure::AppState;
use crate::models::customer::CustomerDto;
use crate::services::customer_service::{self, CustomerFilter};

#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    pub kyc_status: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct KycSubmission {
    pub document_type: String,
    pub document_number: String,
}

#[derive(Debug, Deserialize)]
pub struct KycReview {
    pub approve: bool,
    pub reason: Option<String>,
}

/// GET /api/customers
pub async fn list_customers(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Query(params): Query<CustomersQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = CustomerFilter {
        kyc_status: params.kyc_status,
        q: params.q,
        include_inactive: params.include_inactive,
    };

    let customers = customer_service::list_customers(&db, filter).await?;
    Ok(Json(json!({
        "customers": customers,
        "total": customers.len()
    })))
}

/// POST /api/customers
pub async fn create_customer(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Json(payload): Json<CustomerDto>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let customer = customer_service::create_customer(&db, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "customer": customer
        })),
    ))
}

/// GET /api/customers/:id
pub async fn get_customer(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let customer = customer_service::get_customer(&db, id).await?;
    Ok(Json(json!({ "customer": customer })))
}

/// PUT /api/customers/:id
pub async fn update_customer(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<CustomerDto>,
) -> Result<Json<Value>, DomainError> {
    let customer = customer_service::update_customer(&db, id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "customer": customer
    })))
}

/// DELETE /api/customers/:id - soft delete
pub async fn delete_customer(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    customer_service::deactivate_customer(&db, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Customer deactivated"
    })))
}

/// POST /api/customers/:id/kyc
pub async fn submit_kyc(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<KycSubmission>,
) -> Result<Json<Value>, DomainError> {
    let customer =
        customer_service::submit_kyc(&db, id, payload.document_type, payload.document_number)
            .await?;
    Ok(Json(json!({
        "success": true,
        "customer": customer
    })))
}

/// POST /api/customers/:id/kyc/review - admin decision
pub async fn review_kyc(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<KycReview>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let customer = customer_service::review_kyc(&db, id, payload.approve, payload.reason).await?;
    Ok(Json(json!({
        "success": true,
        "customer": customer
    })))
}

/// GET /api/customers/:id/loyalty - account with resolved tier, if any
pub async fn get_customer_loyalty(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    customer_service::get_customer(state.db(), id).await?;
    let loyalty = state.loyalty();

    match loyalty.find_by_customer(id).await? {
        Some(account) => {
            let summary = loyalty.summarize(account).await?;
            Ok(Json(json!({ "account": summary })))
        }
        None => Ok(Json(json!({ "account": null }))),
    }
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::services::invoice_service::{self, InvoiceFilter};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoicesQuery {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
}

/// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    params(InvoicesQuery),
    responses(
        (status = 200, description = "Invoices, newest first")
    )
)]
pub async fn list_invoices(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Query(params): Query<InvoicesQuery>,
) -> Result<Json<Value>, DomainError> {
    let invoices = invoice_service::list_invoices(
        &db,
        InvoiceFilter {
            customer_id: params.customer_id,
            status: params.status,
        },
    )
    .await?;

    Ok(Json(json!({
        "invoices": invoices,
        "total": invoices.len()
    })))
}

/// GET /api/invoices/:id - printable document
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Printable invoice document"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn get_invoice(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let document = invoice_service::get_invoice_document(&db, id).await?;
    Ok(Json(json!({ "invoice": document })))
}

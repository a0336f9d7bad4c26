use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::order_service::{self, OrderFilter, PlaceOrderInput};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrdersQuery {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
}

/// POST /api/orders - checkout a cart
#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Order, invoice and points earned"),
        (status = 400, description = "Empty cart or invalid quantity"),
        (status = 409, description = "Insufficient stock, or customer not KYC verified")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<PlaceOrderInput>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let placed = order_service::place_order(
        state.db(),
        &state.loyalty(),
        &state.settings,
        claims.uid,
        payload,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "order": placed.order,
            "items": placed.items,
            "invoice": placed.invoice,
            "loyalty": placed.loyalty
        })),
    ))
}

/// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrdersQuery),
    responses(
        (status = 200, description = "Orders, newest first")
    )
)]
pub async fn list_orders(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Query(params): Query<OrdersQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = OrderFilter {
        customer_id: params.customer_id,
        status: params.status,
    };
    let orders = order_service::list_orders(&db, filter).await?;
    Ok(Json(json!({
        "orders": orders,
        "total": orders.len()
    })))
}

/// GET /api/orders/:id
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with lines, customer and invoice number"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let order = order_service::get_order(&db, id).await?;
    Ok(Json(json!({ "order": order })))
}

/// POST /api/orders/:id/cancel
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled, stock restored and invoice voided"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already cancelled")
    )
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let order = order_service::cancel_order(state.db(), &state.loyalty(), id).await?;
    Ok(Json(json!({
        "success": true,
        "order": order
    })))
}

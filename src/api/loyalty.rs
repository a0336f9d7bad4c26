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
use crate::domain::{DomainError, TierInput, TransactionKind};
use crate::infrastructure::AppState;
use crate::models::loyalty_reward::RewardDto;
use crate::services::{customer_service, reward_service};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    /// Points balance to classify
    pub points: i64,
}

#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    pub customer_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct PointsRequest {
    pub kind: TransactionKind,
    pub points: i64,
    pub reference: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub reward_id: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RewardsQuery {
    #[serde(default)]
    pub active_only: bool,
}

// ---- Tiers ----

#[utoipa::path(
    get,
    path = "/api/loyalty/tiers",
    responses(
        (status = 200, description = "Tiers sorted by min_points"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_tiers(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<Json<Value>, DomainError> {
    let tiers = state.loyalty().list_tiers().await?;
    Ok(Json(json!({
        "tiers": tiers,
        "total": tiers.len()
    })))
}

#[utoipa::path(
    post,
    path = "/api/loyalty/tiers",
    responses(
        (status = 201, description = "Tier created"),
        (status = 400, description = "Invalid bounds"),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn create_tier(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<TierInput>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    claims.require_admin()?;
    let tier = state.loyalty().create_tier(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "tier": tier
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/loyalty/tiers/{id}",
    params(("id" = i32, Path, description = "Tier id")),
    responses(
        (status = 200, description = "Tier updated"),
        (status = 400, description = "Invalid bounds"),
        (status = 404, description = "Tier not found")
    )
)]
pub async fn update_tier(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<TierInput>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let tier = state.loyalty().update_tier(id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "tier": tier
    })))
}

#[utoipa::path(
    delete,
    path = "/api/loyalty/tiers/{id}",
    params(("id" = i32, Path, description = "Tier id")),
    responses(
        (status = 200, description = "Tier deleted, its accounts have no tier until recalculated"),
        (status = 404, description = "Tier not found")
    )
)]
pub async fn delete_tier(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    state.loyalty().delete_tier(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Tier deleted"
    })))
}

/// POST /api/loyalty/tiers/recalculate - reassign every account after tier edits
#[utoipa::path(
    post,
    path = "/api/loyalty/tiers/recalculate",
    responses(
        (status = 200, description = "Number of accounts whose tier changed"),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn recalculate_tiers(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let changed = state.loyalty().recalculate_all().await?;
    Ok(Json(json!({
        "success": true,
        "changed": changed
    })))
}

#[utoipa::path(
    get,
    path = "/api/loyalty/tiers/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Tier name, or \"No Tier\"")
    )
)]
pub async fn resolve_tier(
    State(state): State<AppState>,
    _claims: Claims,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<Value>, DomainError> {
    let tier = state.loyalty().resolve_name(params.points).await?;
    Ok(Json(json!({
        "points": params.points,
        "tier": tier
    })))
}

// ---- Accounts ----

/// POST /api/loyalty/accounts - enrol a customer
#[utoipa::path(
    post,
    path = "/api/loyalty/accounts",
    responses(
        (status = 201, description = "Account opened in the entry tier"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer already enrolled")
    )
)]
pub async fn open_account(
    State(state): State<AppState>,
    _claims: Claims,
    Json(payload): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    customer_service::get_customer(state.db(), payload.customer_id).await?;
    let loyalty = state.loyalty();
    let account = loyalty.open_account(payload.customer_id).await?;
    let summary = loyalty.summarize(account).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "account": summary
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/loyalty/accounts/{id}",
    params(("id" = i32, Path, description = "Loyalty account id")),
    responses(
        (status = 200, description = "Account with its tier name"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let loyalty = state.loyalty();
    let account = loyalty.find_account(id).await?;
    let summary = loyalty.summarize(account).await?;
    Ok(Json(json!({ "account": summary })))
}

#[utoipa::path(
    get,
    path = "/api/loyalty/accounts/{id}/transactions",
    params(("id" = i32, Path, description = "Loyalty account id")),
    responses(
        (status = 200, description = "Points history, newest first"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let transactions = state.loyalty().transactions(id).await?;
    Ok(Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    })))
}

/// POST /api/loyalty/accounts/:id/transactions - manual points movement
#[utoipa::path(
    post,
    path = "/api/loyalty/accounts/{id}/transactions",
    params(("id" = i32, Path, description = "Loyalty account id")),
    responses(
        (status = 201, description = "Points recorded and tier re-evaluated"),
        (status = 400, description = "Invalid or out of range points"),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Balance would become negative")
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<PointsRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    claims.require_admin()?;
    let outcome = state
        .loyalty()
        .apply_points(id, payload.kind, payload.points, payload.reference, payload.note)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "account": outcome.account,
            "transaction": outcome.transaction,
            "tier": outcome.tier
        })),
    ))
}

/// POST /api/loyalty/accounts/:id/redeem
#[utoipa::path(
    post,
    path = "/api/loyalty/accounts/{id}/redeem",
    params(("id" = i32, Path, description = "Loyalty account id")),
    responses(
        (status = 200, description = "Reward redeemed"),
        (status = 404, description = "Account or reward not found"),
        (status = 409, description = "Not enough points or reward inactive")
    )
)]
pub async fn redeem(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<Value>, DomainError> {
    let outcome =
        reward_service::redeem_reward(state.db(), &state.loyalty(), id, payload.reward_id).await?;
    Ok(Json(json!({
        "success": true,
        "account": outcome.account,
        "transaction": outcome.transaction,
        "tier": outcome.tier
    })))
}

// ---- Rewards ----

#[utoipa::path(
    get,
    path = "/api/loyalty/rewards",
    params(RewardsQuery),
    responses(
        (status = 200, description = "Reward catalogue")
    )
)]
pub async fn list_rewards(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Query(params): Query<RewardsQuery>,
) -> Result<Json<Value>, DomainError> {
    let rewards = reward_service::list_rewards(&db, params.active_only).await?;
    Ok(Json(json!({
        "rewards": rewards,
        "total": rewards.len()
    })))
}

pub async fn create_reward(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<RewardDto>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    claims.require_admin()?;
    let reward = reward_service::create_reward(&db, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "reward": reward
        })),
    ))
}

pub async fn update_reward(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<RewardDto>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let reward = reward_service::update_reward(&db, id, payload).await?;
    Ok(Json(json!({
        "success": true,
        "reward": reward
    })))
}

pub async fn delete_reward(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    reward_service::delete_reward(&db, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Reward deleted"
    })))
}

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::dashboard_service;

/// GET /api/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, DomainError> {
    claims.require_admin()?;
    let summary = dashboard_service::summary(state.db(), &state.loyalty()).await?;
    Ok(Json(json!({ "summary": summary })))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::services::plans::{PlanTier, APPOINTMENT_CREDIT_COST};
use crate::services::CreditService;

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub limit: Option<usize>,
}

#[axum::debug_handler]
pub async fn get_ledger(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Value>, AppError> {
    let credit_service = CreditService::new(&state);
    let ledger = credit_service.get_ledger(&user.id, query.limit).await?;

    Ok(Json(json!({
        "success": true,
        "balance": ledger.balance,
        "plan_id": ledger.plan_id,
        "transactions": ledger.transactions
    })))
}

/// Called on every authenticated page load; a no-op once the cycle is paid.
#[axum::debug_handler]
pub async fn allocate_credits(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let credit_service = CreditService::new(&state);
    let outcome = credit_service.allocate_monthly_credits(&user.id, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "allocation": outcome
    })))
}

pub async fn list_plans() -> Json<Value> {
    let plans: Vec<Value> = PlanTier::ALL
        .iter()
        .map(|tier| {
            json!({
                "tier": tier,
                "plan_id": tier.plan_id(),
                "monthly_credits": tier.monthly_credits(),
                "appointments_per_month": tier.monthly_credits() / APPOINTMENT_CREDIT_COST
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "appointment_cost": APPOINTMENT_CREDIT_COST,
        "plans": plans
    }))
}

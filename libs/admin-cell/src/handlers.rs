use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use credit_cell::models::CreditAdjustmentRequest;
use credit_cell::CreditService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::user::UserRole;
use user_cell::UserService;

use crate::models::{ActiveUpdate, AdminError, DashboardQuery, VerificationUpdate};
use crate::services::{dashboard::DashboardService, doctors::DoctorAdminService};

async fn require_admin(state: &AppConfig, user: &User) -> Result<(), AdminError> {
    UserService::new(state).require_role(&user.id, UserRole::Admin).await?;
    Ok(())
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let dashboard = DashboardService::new(&state).build(query.days, Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "dashboard": dashboard
    })))
}

#[axum::debug_handler]
pub async fn list_pending_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let doctors = DoctorAdminService::new(&state).list_pending().await?;

    Ok(Json(json!({
        "success": true,
        "total": doctors.len(),
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn list_verified_doctors(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let doctors = DoctorAdminService::new(&state).list_verified().await?;

    Ok(Json(json!({
        "success": true,
        "total": doctors.len(),
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn update_verification(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<VerificationUpdate>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let doctor = DoctorAdminService::new(&state)
        .update_verification(doctor_id, request.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn set_doctor_active(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<ActiveUpdate>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let doctor = DoctorAdminService::new(&state)
        .set_active(doctor_id, request.active)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn adjust_user_credits(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CreditAdjustmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state, &user).await?;

    let updated = CreditService::new(&state)
        .adjust_credits(user_id, request.amount, &request.reason)
        .await
        .map_err(AdminError::from)?;

    Ok(Json(json!({
        "success": true,
        "user_id": updated.id,
        "balance": updated.credits
    })))
}

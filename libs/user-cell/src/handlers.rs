use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{OnboardingRequest, VET_SPECIALTIES};
use crate::services::UserService;

#[axum::debug_handler]
pub async fn get_current_user(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_service = UserService::new(&state);
    let record = user_service.current_user(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "user": record
    })))
}

/// Called by the client after sign-in; idempotent.
#[axum::debug_handler]
pub async fn sync_current_user(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_service = UserService::new(&state);
    let record = user_service.ensure_user(&user).await?;

    Ok(Json(json!({
        "success": true,
        "user": record
    })))
}

#[axum::debug_handler]
pub async fn complete_onboarding(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<Value>, AppError> {
    let user_service = UserService::new(&state);
    let record = user_service.complete_onboarding(&user.id, request).await?;

    let redirect = match record.role {
        shared_models::user::UserRole::Doctor => "/doctor/verification",
        _ => "/doctors",
    };

    Ok(Json(json!({
        "success": true,
        "user": record,
        "redirect": redirect
    })))
}

pub async fn list_specialties() -> Json<Value> {
    Json(json!({
        "success": true,
        "specialties": VET_SPECIALTIES
    }))
}

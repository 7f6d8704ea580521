use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Every route here also checks the ADMIN role in its handler.
pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/doctors/pending", get(handlers::list_pending_doctors))
        .route("/doctors/verified", get(handlers::list_verified_doctors))
        .route("/doctors/{doctor_id}/verification", patch(handlers::update_verification))
        .route("/doctors/{doctor_id}/active", patch(handlers::set_doctor_active))
        .route("/users/{user_id}/credits", post(handlers::adjust_user_credits))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

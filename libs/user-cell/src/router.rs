use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn user_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/specialties", get(handlers::list_specialties));

    let protected_routes = Router::new()
        .route("/me", get(handlers::get_current_user).post(handlers::sync_current_user))
        .route("/onboarding", post(handlers::complete_onboarding))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn credit_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/plans", get(handlers::list_plans));

    let protected_routes = Router::new()
        .route("/", get(handlers::get_ledger))
        .route("/allocate", post(handlers::allocate_credits))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

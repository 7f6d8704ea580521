use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Provider-to-server callbacks. Authenticated by signature, not by JWT.
pub fn webhook_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/users", post(handlers::receive_user_event))
        .with_state(state)
}

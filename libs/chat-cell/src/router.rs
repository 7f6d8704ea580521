use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::models::MAX_REQUEST_BYTES;

pub fn chat_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        // Base64 images outgrow the default 2 MB body limit.
        .route(
            "/",
            post(handlers::send_message).layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES)),
        )
        .route("/conversations", get(handlers::list_conversations))
        .route(
            "/conversations/{conversation_id}",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::router::admin_routes;
use appointment_cell::router::appointment_routes;
use chat_cell::router::chat_routes;
use credit_cell::router::credit_routes;
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use user_cell::router::user_routes;
use webhook_cell::router::webhook_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "VetLink API is running!" }))
        .nest("/users", user_routes(state.clone()))
        .nest("/credits", credit_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/chat", chat_routes(state.clone()))
        .nest("/webhooks", webhook_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ClerkEvent, WebhookError};
use crate::services::UserSyncService;
use crate::signing::verify_signature;

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(WebhookError::MissingHeader(name))
}

/// Receive a user lifecycle event. The body is only parsed once the
/// signature over the raw bytes checks out.
#[axum::debug_handler]
pub async fn receive_user_event(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let msg_id = header(&headers, "svix-id")?;
    let timestamp = header(&headers, "svix-timestamp")?;
    let signature = header(&headers, "svix-signature")?;

    if !state.is_webhook_configured() {
        return Err(WebhookError::NotConfigured.into());
    }

    verify_signature(
        msg_id,
        timestamp,
        signature,
        &body,
        &state.webhook_signing_secret,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!("Rejected webhook {}: {}", msg_id, e);
        WebhookError::from(e)
    })?;

    let event: ClerkEvent = serde_json::from_slice(&body).map_err(WebhookError::from)?;
    let outcome = UserSyncService::new(&state).handle_event(event).await?;

    Ok(Json(json!({
        "success": true,
        "result": outcome
    })))
}

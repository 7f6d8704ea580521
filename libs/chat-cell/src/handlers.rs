use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use user_cell::UserService;

use crate::models::ChatRequest;
use crate::services::{ChatService, ConversationService};

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    let chat_service = ChatService::new(&state)?;
    let reply = chat_service.handle_message(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "intent": reply.intent,
        "conversation_id": reply.conversation_id,
        "reply": reply.reply
    })))
}

#[axum::debug_handler]
pub async fn list_conversations(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let owner = UserService::new(&state).current_user(&user.id).await?;
    let conversations = ConversationService::new(&state).list(owner.id).await?;

    Ok(Json(json!({
        "success": true,
        "conversations": conversations
    })))
}

#[axum::debug_handler]
pub async fn get_conversation(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let owner = UserService::new(&state).current_user(&user.id).await?;
    let detail = ConversationService::new(&state)
        .detail(owner.id, conversation_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "conversation": detail.conversation,
        "messages": detail.messages
    })))
}

#[axum::debug_handler]
pub async fn delete_conversation(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let owner = UserService::new(&state).current_user(&user.id).await?;
    ConversationService::new(&state)
        .delete(owner.id, conversation_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Conversation deleted"
    })))
}

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::chat::{ChatConversation, ChatMessage};
use shared_models::error::AppError;
use user_cell::UserError;

pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;
pub const MAX_MESSAGE_CHARS: usize = 4000;
/// Largest accepted request body: a maximal image in base64 plus the message.
pub const MAX_REQUEST_BYTES: usize = MAX_IMAGE_BYTES.div_ceil(3) * 4 + 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 without a `data:` prefix.
    pub data: String,
}

impl ImageAttachment {
    pub fn validate(&self) -> Result<(), ChatError> {
        if !self.mime_type.starts_with("image/") {
            return Err(ChatError::Validation(format!(
                "Unsupported attachment type {}",
                self.mime_type
            )));
        }

        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|_| ChatError::Validation("Image data is not valid base64".to_string()))?;

        if bytes.is_empty() {
            return Err(ChatError::Validation("Image is empty".to_string()));
        }
        if bytes.len() >= MAX_IMAGE_BYTES {
            return Err(ChatError::Validation("Image must be smaller than 4 MB".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub image: Option<ImageAttachment>,
    pub conversation_id: Option<Uuid>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), ChatError> {
        let text = self.message.trim();
        if text.is_empty() && self.image.is_none() {
            return Err(ChatError::Validation("Message cannot be empty".to_string()));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::Validation(format!(
                "Message is limited to {} characters",
                MAX_MESSAGE_CHARS
            )));
        }
        if let Some(image) = &self.image {
            image.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatIntent {
    FindClinic,
    General,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub intent: ChatIntent,
    pub conversation_id: Uuid,
    /// Absent for `find_clinic`; the client runs its own nearby lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    pub conversation: ChatConversation,
    pub messages: Vec<ChatMessage>,
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Chat assistant is not configured")]
    NotConfigured,

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("AI provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => AppError::ValidationError(msg),
            ChatError::ConversationNotFound => AppError::NotFound(err.to_string()),
            // Provider details are logged by the client, never returned.
            ChatError::NotConfigured | ChatError::Provider(_) | ChatError::Transport(_) => {
                AppError::Internal("The assistant is unavailable right now".to_string())
            }
            ChatError::User(e) => e.into(),
            ChatError::Database(e) => e.into(),
        }
    }
}

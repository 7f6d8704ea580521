pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ChatError, ChatIntent, ChatReply, ChatRequest, ImageAttachment};
pub use services::{ChatService, ConversationService, GeminiClient};

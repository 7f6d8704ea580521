pub mod assistant;
pub mod conversation;
pub mod gemini;
pub mod intent;

pub use assistant::ChatService;
pub use conversation::ConversationService;
pub use gemini::GeminiClient;

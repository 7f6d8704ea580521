use chrono::Utc;
use tracing::{debug, info};

use shared_config::AppConfig;
use user_cell::UserService;

use crate::models::{ChatError, ChatIntent, ChatReply, ChatRequest};
use crate::services::conversation::ConversationService;
use crate::services::gemini::GeminiClient;
use crate::services::intent::{parse_intent, ASSISTANT_PROMPT, CLASSIFIER_PROMPT, FIND_CLINIC_NOTE};

pub struct ChatService {
    gemini: GeminiClient,
    conversations: ConversationService,
    users: UserService,
}

impl ChatService {
    pub fn new(config: &AppConfig) -> Result<Self, ChatError> {
        Ok(Self {
            gemini: GeminiClient::new(config)?,
            conversations: ConversationService::new(config),
            users: UserService::new(config),
        })
    }

    /// Route one message: classify it, then either hand the clinic search
    /// back to the client or relay the assistant's answer.
    pub async fn handle_message(&self, auth_id: &str, request: ChatRequest) -> Result<ChatReply, ChatError> {
        request.validate()?;
        let asked_at = Utc::now();

        let user = self.users.current_user(auth_id).await?;
        let existing = match request.conversation_id {
            Some(id) => Some(self.conversations.get_owned(user.id, id).await?),
            None => None,
        };

        let intent = self.classify(&request.message).await?;
        debug!("Message from user {} classified as {:?}", user.id, intent);

        let (reply, stored_answer) = match intent {
            ChatIntent::FindClinic => (None, FIND_CLINIC_NOTE.to_string()),
            ChatIntent::General => {
                let answer = self
                    .gemini
                    .generate(ASSISTANT_PROMPT, &request.message, request.image.as_ref())
                    .await?;
                (Some(answer.clone()), answer)
            }
        };

        // A failed provider call leaves no empty conversation behind.
        let conversation = match existing {
            Some(conversation) => conversation,
            None => self.conversations.create(user.id, &request.message).await?,
        };
        self.conversations
            .record_exchange(conversation.id, request.message.trim(), asked_at, &stored_answer)
            .await?;

        info!("Answered message for user {} ({:?})", user.id, intent);
        Ok(ChatReply {
            intent,
            conversation_id: conversation.id,
            reply,
        })
    }

    /// An image with no text has nothing to route on and goes to the assistant.
    async fn classify(&self, message: &str) -> Result<ChatIntent, ChatError> {
        if message.trim().is_empty() {
            return Ok(ChatIntent::General);
        }
        let label = self.gemini.generate(CLASSIFIER_PROMPT, message, None).await?;
        Ok(parse_intent(&label))
    }
}

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::chat::{ChatConversation, ChatMessage, ChatRole};

use crate::models::{ChatError, ConversationDetail};

pub const TITLE_CHARS: usize = 60;
pub const UNTITLED: &str = "Photo question";

pub struct ConversationService {
    supabase: SupabaseClient,
}

impl ConversationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create(&self, user_id: Uuid, first_message: &str) -> Result<ChatConversation, ChatError> {
        let now = Utc::now().to_rfc3339();
        let rows: Vec<ChatConversation> = self
            .supabase
            .request(
                Method::POST,
                "/rest/v1/chat_conversations",
                Some(json!({
                    "user_id": user_id,
                    "title": title_from(first_message),
                    "created_at": now,
                    "updated_at": now
                })),
            )
            .await?;

        let conversation = rows.into_iter().next().ok_or(ChatError::ConversationNotFound)?;
        debug!("Started conversation {} for user {}", conversation.id, user_id);
        Ok(conversation)
    }

    /// A conversation the user owns; someone else's is reported missing.
    pub async fn get_owned(&self, user_id: Uuid, conversation_id: Uuid) -> Result<ChatConversation, ChatError> {
        let path = format!(
            "/rest/v1/chat_conversations?id=eq.{}&user_id=eq.{}",
            conversation_id, user_id
        );
        self.supabase
            .fetch_optional(&path)
            .await?
            .ok_or(ChatError::ConversationNotFound)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ChatConversation>, ChatError> {
        let path = format!(
            "/rest/v1/chat_conversations?user_id=eq.{}&order=updated_at.desc",
            user_id
        );
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    pub async fn detail(&self, user_id: Uuid, conversation_id: Uuid) -> Result<ConversationDetail, ChatError> {
        let conversation = self.get_owned(user_id, conversation_id).await?;
        let path = format!(
            "/rest/v1/chat_messages?conversation_id=eq.{}&order=created_at.asc",
            conversation.id
        );
        let messages: Vec<ChatMessage> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(ConversationDetail { conversation, messages })
    }

    /// Store a question and its answer, then bump the conversation.
    pub async fn record_exchange(
        &self,
        conversation_id: Uuid,
        question: &str,
        asked_at: DateTime<Utc>,
        answer: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let answered_at = Utc::now().max(asked_at);
        let rows = json!([
            {
                "conversation_id": conversation_id,
                "role": ChatRole::User,
                "content": question,
                "created_at": asked_at.to_rfc3339()
            },
            {
                "conversation_id": conversation_id,
                "role": ChatRole::Assistant,
                "content": answer,
                "created_at": answered_at.to_rfc3339()
            }
        ]);

        let messages: Vec<ChatMessage> = self
            .supabase
            .request(Method::POST, "/rest/v1/chat_messages", Some(rows))
            .await?;

        let path = format!("/rest/v1/chat_conversations?id=eq.{}", conversation_id);
        let _: Vec<ChatConversation> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(json!({ "updated_at": answered_at.to_rfc3339() })),
            )
            .await?;

        Ok(messages)
    }

    /// Delete a conversation and, through the foreign key, its messages.
    pub async fn delete(&self, user_id: Uuid, conversation_id: Uuid) -> Result<(), ChatError> {
        let path = format!(
            "/rest/v1/chat_conversations?id=eq.{}&user_id=eq.{}",
            conversation_id, user_id
        );
        let deleted: Vec<ChatConversation> = self.supabase.request(Method::DELETE, &path, None).await?;
        if deleted.is_empty() {
            return Err(ChatError::ConversationNotFound);
        }

        info!("User {} deleted conversation {}", user_id, conversation_id);
        Ok(())
    }
}

pub fn title_from(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return UNTITLED.to_string();
    }
    trimmed.chars().take(TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_the_start_of_the_first_message() {
        assert_eq!(title_from("  Why does my cat sneeze?  "), "Why does my cat sneeze?");
        assert_eq!(title_from(&"é".repeat(100)).chars().count(), TITLE_CHARS);
        assert_eq!(title_from(""), UNTITLED);
    }
}

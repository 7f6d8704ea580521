use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::user::UserRecord;

use crate::models::{ClerkDeletedObject, ClerkEvent, ClerkUser, SyncOutcome, WebhookError};

/// Mirrors auth-provider user events into the `users` table.
pub struct UserSyncService {
    supabase: SupabaseClient,
}

impl UserSyncService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn handle_event(&self, event: ClerkEvent) -> Result<SyncOutcome, WebhookError> {
        match event.event_type.as_str() {
            "user.created" | "user.updated" => {
                let user: ClerkUser = serde_json::from_value(event.data)?;
                self.upsert_user(&user).await
            }
            "user.deleted" => {
                let deleted: ClerkDeletedObject = serde_json::from_value(event.data)?;
                let auth_id = deleted
                    .id
                    .ok_or_else(|| WebhookError::InvalidPayload("deleted user has no id".to_string()))?;
                self.delete_user(&auth_id).await
            }
            other => {
                debug!("Ignoring webhook event {}", other);
                Ok(SyncOutcome::Ignored(other.to_string()))
            }
        }
    }

    /// Insert or refresh profile fields. Role and credits are left to column
    /// defaults on insert and never touched on update.
    async fn upsert_user(&self, user: &ClerkUser) -> Result<SyncOutcome, WebhookError> {
        let row = profile_row(user)?;
        let rows: Vec<UserRecord> = self.supabase.upsert("users", "auth_id", row).await?;

        match rows.first() {
            Some(record) => info!("Synced user {} ({}) as {}", record.id, user.id, record.role),
            None => debug!("Upsert of {} returned no row", user.id),
        }
        Ok(SyncOutcome::Upserted(user.id.clone()))
    }

    async fn delete_user(&self, auth_id: &str) -> Result<SyncOutcome, WebhookError> {
        let path = format!("/rest/v1/users?auth_id=eq.{}", urlencoding::encode(auth_id));
        let removed: Vec<UserRecord> = self.supabase.request(Method::DELETE, &path, None).await?;

        info!("Deleted {} user row(s) for {}", removed.len(), auth_id);
        Ok(SyncOutcome::Deleted(auth_id.to_string()))
    }
}

/// Columns written by a sync. `plan_id` is only sent when the provider
/// carries one so a profile edit does not clear the plan.
pub fn profile_row(user: &ClerkUser) -> Result<Value, WebhookError> {
    let email = user
        .primary_email()
        .ok_or_else(|| WebhookError::InvalidPayload(format!("user {} has no email address", user.id)))?;

    let mut row = Map::new();
    row.insert("auth_id".to_string(), json!(user.id));
    row.insert("email".to_string(), json!(email));
    row.insert("name".to_string(), json!(user.full_name()));
    row.insert("image_url".to_string(), json!(user.image_url));
    row.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));
    if let Some(plan) = user.plan() {
        row.insert("plan_id".to_string(), json!(plan.trim()));
    }
    Ok(Value::Object(row))
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

use crate::signing::SignatureError;

/// Envelope of an auth-provider webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: String,
    pub email_address: String,
}

/// The `data` of `user.created` and `user.updated`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    pub primary_email_address_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_metadata: Value,
}

impl ClerkUser {
    /// The primary address, or the first one when none is marked primary.
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self
            .primary_email_address_id
            .as_deref()
            .and_then(|id| self.email_addresses.iter().find(|e| e.id == id));

        primary
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }

    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    pub fn plan(&self) -> Option<&str> {
        self.public_metadata["plan"].as_str().filter(|p| !p.trim().is_empty())
    }
}

/// The `data` of `user.deleted`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkDeletedObject {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "subject", rename_all = "snake_case")]
pub enum SyncOutcome {
    Upserted(String),
    Deleted(String),
    Ignored(String),
}

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Webhook signing secret is not configured")]
    NotConfigured,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::InvalidPayload(err.to_string())
    }
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::MissingHeader(_) | WebhookError::InvalidPayload(_) => AppError::BadRequest(err.to_string()),
            WebhookError::InvalidSignature(_) => AppError::Auth(err.to_string()),
            WebhookError::NotConfigured => AppError::Internal(err.to_string()),
            WebhookError::Database(e) => e.into(),
        }
    }
}

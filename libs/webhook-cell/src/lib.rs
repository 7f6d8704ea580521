pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod signing;

pub use models::{ClerkEvent, SyncOutcome, WebhookError};
pub use services::UserSyncService;

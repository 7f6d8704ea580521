use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
}

impl DatabaseError {
    /// Classify a non-2xx PostgREST response.
    ///
    /// Database functions raise plain exceptions for rule violations, which
    /// PostgREST reports as 400; exclusion and unique violations come back as 409.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<PostgrestError>(body)
            .ok()
            .and_then(|e| e.message.or(e.details))
            .unwrap_or_else(|| body.to_string());

        match status {
            400 => DatabaseError::Rejected(message),
            401 | 403 => DatabaseError::Unauthorized(message),
            404 => DatabaseError::NotFound(message),
            409 => DatabaseError::Conflict(message),
            _ => DatabaseError::Api { status, body: body.to_string() },
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => AppError::NotFound(msg),
            DatabaseError::Conflict(msg) => AppError::Conflict(msg),
            DatabaseError::Rejected(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other.to_string()),
        }
    }
}

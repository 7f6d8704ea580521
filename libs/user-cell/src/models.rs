use serde::Deserialize;
use thiserror::Error;
use url::Url;

use shared_database::DatabaseError;
use shared_models::error::AppError;

pub const VET_SPECIALTIES: &[&str] = &[
    "General Practice",
    "Surgery",
    "Dermatology",
    "Dentistry",
    "Cardiology",
    "Internal Medicine",
    "Oncology",
    "Ophthalmology",
    "Behavior",
    "Nutrition",
    "Emergency & Critical Care",
    "Exotic Animals",
];

pub const MAX_EXPERIENCE_YEARS: i32 = 60;

/// Role chosen on the onboarding screen.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingRequest {
    Patient,
    Doctor {
        specialty: String,
        experience: i32,
        credential_url: String,
        description: String,
    },
}

impl OnboardingRequest {
    pub fn validate(&self) -> Result<(), UserError> {
        let OnboardingRequest::Doctor { specialty, experience, credential_url, description } = self
        else {
            return Ok(());
        };

        if !VET_SPECIALTIES.contains(&specialty.as_str()) {
            return Err(UserError::Validation(format!("Unknown specialty: {}", specialty)));
        }
        if !(0..=MAX_EXPERIENCE_YEARS).contains(experience) {
            return Err(UserError::Validation(format!(
                "Experience must be between 0 and {} years",
                MAX_EXPERIENCE_YEARS
            )));
        }
        let is_web_link = Url::parse(credential_url.trim())
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()))
            .unwrap_or(false);
        if !is_web_link {
            return Err(UserError::Validation("Credential URL must be an http(s) link".to_string()));
        }
        if description.trim().is_empty() {
            return Err(UserError::Validation("Description is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("User has already completed onboarding")]
    AlreadyOnboarded,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::Forbidden(msg) => AppError::Forbidden(msg),
            UserError::AlreadyOnboarded => AppError::Conflict(err.to_string()),
            UserError::Validation(msg) => AppError::ValidationError(msg),
            UserError::Database(e) => e.into(),
        }
    }
}

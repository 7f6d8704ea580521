use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;
use user_cell::UserError;

/// A bookable interval derived from a doctor's daily window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid availability window: {0}")]
    InvalidWindow(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor must be verified before managing availability")]
    NotVerified,

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidWindow(_) => AppError::ValidationError(err.to_string()),
            AvailabilityError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AvailabilityError::NotVerified => AppError::Forbidden(err.to_string()),
            AvailabilityError::User(e) => e.into(),
            AvailabilityError::Database(e) => e.into(),
        }
    }
}

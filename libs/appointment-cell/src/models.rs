use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::AvailabilityError;
use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_models::scheduling::{Appointment, AppointmentStatus};
use user_cell::UserError;

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

/// What `book_appointment` returns: the new row and the patient's balance
/// after the debit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub appointment: Appointment,
    pub balance: i32,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("{0}")]
    Validation(String),

    #[error("The requested time overlaps an existing appointment")]
    ConflictDetected,

    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i32, available: i32 },

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment cannot be completed before it ends")]
    NotFinished,

    #[error("Notes cannot be added to a {0} appointment")]
    NotesLocked(AppointmentStatus),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::InvalidTime(_) => AppError::ValidationError(err.to_string()),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::ConflictDetected => AppError::Conflict(err.to_string()),
            AppointmentError::InsufficientCredits { .. }
            | AppointmentError::InvalidStatusTransition { .. }
            | AppointmentError::NotFinished
            | AppointmentError::NotesLocked(_) => AppError::BadRequest(err.to_string()),
            AppointmentError::User(e) => e.into(),
            AppointmentError::Availability(e) => e.into(),
            AppointmentError::Database(e) => e.into(),
        }
    }
}

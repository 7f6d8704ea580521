use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use credit_cell::CreditError;
use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_models::scheduling::AppointmentStatus;
use shared_models::user::{UserRole, VerificationStatus};
use user_cell::UserError;

// ==============================================================================
// DASHBOARD
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub new_users: u32,
    pub appointments: u32,
    pub credits_purchased: i64,
}

/// Head counts are all-time; appointment and credit figures cover the window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub patients: u64,
    pub doctors: u64,
    pub pending_verifications: u64,
    pub appointments_scheduled: u64,
    pub appointments_completed: u64,
    pub appointments_cancelled: u64,
    pub credits_purchased: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub days: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub totals: DashboardTotals,
    pub series: Vec<DayBucket>,
}

/// Narrow projections used by the dashboard queries.
#[derive(Debug, Clone, Deserialize)]
pub struct UserStatRow {
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentStatRow {
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRow {
    pub amount: i32,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// DOCTOR MANAGEMENT
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationUpdate {
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveUpdate {
    pub active: bool,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Credit(#[from] CreditError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AdminError::InvalidRequest(msg) => AppError::ValidationError(msg),
            AdminError::InvalidTransition(msg) => AppError::Conflict(msg),
            AdminError::User(e) => e.into(),
            AdminError::Credit(e) => e.into(),
            AdminError::Database(e) => e.into(),
        }
    }
}

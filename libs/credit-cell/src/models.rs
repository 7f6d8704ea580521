use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::credits::CreditTransaction;
use shared_models::error::AppError;
use user_cell::UserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Allocated,
    AlreadyAllocated,
    NotEligible,
    UnknownPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationOutcome {
    pub status: AllocationStatus,
    pub plan_id: String,
    pub credits_granted: i32,
    pub balance: i32,
}

impl AllocationOutcome {
    pub fn allocated(&self) -> bool {
        self.status == AllocationStatus::Allocated
    }
}

/// Result row of the `allocate_credits` database function.
#[derive(Debug, Deserialize)]
pub struct AllocationRpcResult {
    pub allocated: bool,
    pub balance: i32,
}

#[derive(Debug, Serialize)]
pub struct LedgerView {
    pub balance: i32,
    pub plan_id: String,
    pub transactions: Vec<CreditTransaction>,
}

#[derive(Debug, Deserialize)]
pub struct CreditAdjustmentRequest {
    pub amount: i32,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum CreditError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credit amount: {0}")]
    InvalidAmount(String),

    #[error("Adjustment would make the balance negative")]
    InsufficientBalance,

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<CreditError> for AppError {
    fn from(err: CreditError) -> Self {
        match err {
            CreditError::UserNotFound => AppError::NotFound(err.to_string()),
            CreditError::InvalidAmount(msg) => AppError::ValidationError(msg),
            CreditError::InsufficientBalance => AppError::BadRequest(err.to_string()),
            CreditError::User(e) => e.into(),
            CreditError::Database(e) => e.into(),
        }
    }
}

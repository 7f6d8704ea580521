use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditTransactionType {
    CreditPurchase,
    AppointmentDeduction,
    AdminAdjustment,
}

impl fmt::Display for CreditTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditTransactionType::CreditPurchase => write!(f, "CREDIT_PURCHASE"),
            CreditTransactionType::AppointmentDeduction => write!(f, "APPOINTMENT_DEDUCTION"),
            CreditTransactionType::AdminAdjustment => write!(f, "ADMIN_ADJUSTMENT"),
        }
    }
}

/// Append-only ledger row of `credit_transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    #[serde(rename = "type")]
    pub transaction_type: CreditTransactionType,
    pub package_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AllocationOutcome, AllocationStatus, CreditError, LedgerView};
pub use services::allocation::{allocation_due, billing_period_start};
pub use services::plans::{credits_for_plan, PlanTier, APPOINTMENT_CREDIT_COST, DEFAULT_PLAN_ID};
pub use services::CreditService;

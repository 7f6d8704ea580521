use chrono::{DateTime, Datelike, TimeZone, Utc};

use shared_models::credits::{CreditTransaction, CreditTransactionType};

/// Start of the monthly billing cycle containing `now` (UTC calendar month).
pub fn billing_period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Whether the plan's grant for the current cycle is still outstanding.
///
/// The grant is considered paid when the user's latest purchase row falls in
/// this cycle and was made for the same plan. Switching plans mid-cycle grants
/// the new plan's credits once.
pub fn allocation_due(
    latest_purchase: Option<&CreditTransaction>,
    plan_id: &str,
    now: DateTime<Utc>,
) -> bool {
    let Some(latest) = latest_purchase else {
        return true;
    };
    if latest.transaction_type != CreditTransactionType::CreditPurchase {
        return true;
    }

    let same_cycle = latest.created_at >= billing_period_start(now);
    let same_plan = latest.package_id.as_deref() == Some(plan_id);
    !(same_cycle && same_plan)
}

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::credits::{CreditTransaction, CreditTransactionType};
use shared_models::user::{UserRecord, UserRole};
use user_cell::UserService;

use crate::models::{AllocationOutcome, AllocationRpcResult, AllocationStatus, CreditError, LedgerView};
use crate::services::allocation::{allocation_due, billing_period_start};
use crate::services::plans::{PlanTier, DEFAULT_PLAN_ID};

pub const DEFAULT_LEDGER_LIMIT: usize = 50;
pub const MAX_LEDGER_LIMIT: usize = 200;

pub struct CreditService {
    supabase: SupabaseClient,
    users: UserService,
}

impl CreditService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            users: UserService::new(config),
        }
    }

    /// Grant the caller's monthly plan credits if this cycle's grant is outstanding.
    pub async fn allocate_monthly_credits(
        &self,
        auth_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome, CreditError> {
        let user = self.users.current_user(auth_id).await?;
        self.allocate_for_user(&user, now).await
    }

    pub async fn allocate_for_user(
        &self,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome, CreditError> {
        let plan_id = plan_of(user).to_string();
        let skipped = |status| AllocationOutcome {
            status,
            plan_id: plan_id.clone(),
            credits_granted: 0,
            balance: user.credits,
        };

        if user.role != UserRole::Patient {
            debug!("Skipping credit allocation for {} user {}", user.role, user.id);
            return Ok(skipped(AllocationStatus::NotEligible));
        }

        let Some(tier) = PlanTier::from_plan_id(&plan_id) else {
            debug!("User {} is on unrecognized plan {}, granting nothing", user.id, plan_id);
            return Ok(skipped(AllocationStatus::UnknownPlan));
        };

        let latest = self.latest_purchase(user.id).await?;
        if !allocation_due(latest.as_ref(), &plan_id, now) {
            debug!("User {} already received {} credits this cycle", user.id, plan_id);
            return Ok(skipped(AllocationStatus::AlreadyAllocated));
        }

        let amount = tier.monthly_credits();
        let period_start = billing_period_start(now);

        // The function re-checks the cycle under a row lock on the user, so a
        // concurrent allocation that slipped past the check above is a no-op.
        let result: AllocationRpcResult = self
            .supabase
            .rpc(
                "allocate_credits",
                json!({
                    "p_user_id": user.id,
                    "p_amount": amount,
                    "p_package_id": plan_id,
                    "p_period_start": period_start.to_rfc3339_opts(SecondsFormat::Secs, true)
                }),
            )
            .await?;

        if !result.allocated {
            return Ok(AllocationOutcome {
                status: AllocationStatus::AlreadyAllocated,
                plan_id,
                credits_granted: 0,
                balance: result.balance,
            });
        }

        info!("Allocated {} credits to user {} for plan {}", amount, user.id, plan_id);
        Ok(AllocationOutcome {
            status: AllocationStatus::Allocated,
            plan_id,
            credits_granted: amount,
            balance: result.balance,
        })
    }

    pub async fn latest_purchase(&self, user_id: Uuid) -> Result<Option<CreditTransaction>, CreditError> {
        let path = format!(
            "/rest/v1/credit_transactions?user_id=eq.{}&type=eq.{}&order=created_at.desc&limit=1",
            user_id,
            CreditTransactionType::CreditPurchase
        );
        Ok(self.supabase.fetch_optional(&path).await?)
    }

    pub async fn get_ledger(&self, auth_id: &str, limit: Option<usize>) -> Result<LedgerView, CreditError> {
        let user = self.users.current_user(auth_id).await?;
        let limit = limit.unwrap_or(DEFAULT_LEDGER_LIMIT).clamp(1, MAX_LEDGER_LIMIT);

        let path = format!(
            "/rest/v1/credit_transactions?user_id=eq.{}&order=created_at.desc&limit={}",
            user.id, limit
        );
        let transactions: Vec<CreditTransaction> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(LedgerView {
            balance: user.credits,
            plan_id: plan_of(&user).to_string(),
            transactions,
        })
    }

    /// Admin grant or removal, written as one ADMIN_ADJUSTMENT row plus balance.
    pub async fn adjust_credits(
        &self,
        user_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<UserRecord, CreditError> {
        if amount == 0 {
            return Err(CreditError::InvalidAmount("Amount must not be zero".to_string()));
        }
        if reason.trim().is_empty() {
            return Err(CreditError::InvalidAmount("A reason is required".to_string()));
        }

        let user = self.users.find_by_id(user_id).await?.ok_or(CreditError::UserNotFound)?;
        match user.credits.checked_add(amount) {
            None => {
                warn!("Rejected adjustment of {} on user {}: balance would overflow", amount, user.id);
                return Err(CreditError::InvalidAmount("Amount is out of range".to_string()));
            }
            Some(balance) if balance < 0 => {
                warn!("Rejected adjustment of {} on user {} with balance {}", amount, user.id, user.credits);
                return Err(CreditError::InsufficientBalance);
            }
            Some(_) => {}
        }

        let updated: UserRecord = self
            .supabase
            .rpc(
                "adjust_credits",
                json!({
                    "p_user_id": user_id,
                    "p_amount": amount,
                    "p_reason": reason.trim()
                }),
            )
            .await
            .map_err(|e| match e {
                // Raised by the function when the balance changed underneath us.
                DatabaseError::Rejected(_) => CreditError::InsufficientBalance,
                other => CreditError::Database(other),
            })?;

        info!("Adjusted credits of user {} by {} ({})", user_id, amount, reason.trim());
        Ok(updated)
    }
}

fn plan_of(user: &UserRecord) -> &str {
    user.plan_id.as_deref().unwrap_or(DEFAULT_PLAN_ID)
}

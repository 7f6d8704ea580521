use serde::Serialize;

/// Credits charged to the patient (and paid to the doctor) per appointment.
pub const APPOINTMENT_CREDIT_COST: i32 = 2;

/// Plan assumed for users the billing integration has not tagged.
pub const DEFAULT_PLAN_ID: &str = "free_user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Standard,
    Premium,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Standard, PlanTier::Premium];

    pub fn from_plan_id(plan_id: &str) -> Option<Self> {
        match plan_id {
            "free_user" => Some(PlanTier::Free),
            "standard" => Some(PlanTier::Standard),
            "premium" => Some(PlanTier::Premium),
            _ => None,
        }
    }

    pub fn plan_id(&self) -> &'static str {
        match self {
            PlanTier::Free => "free_user",
            PlanTier::Standard => "standard",
            PlanTier::Premium => "premium",
        }
    }

    pub fn monthly_credits(&self) -> i32 {
        match self {
            PlanTier::Free => 2,
            PlanTier::Standard => 10,
            PlanTier::Premium => 24,
        }
    }
}

/// Monthly grant for a plan id; unrecognized plans grant nothing.
pub fn credits_for_plan(plan_id: &str) -> i32 {
    PlanTier::from_plan_id(plan_id)
        .map(|tier| tier.monthly_credits())
        .unwrap_or(0)
}

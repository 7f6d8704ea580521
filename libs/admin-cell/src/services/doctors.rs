use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::user::{UserRecord, UserRole, VerificationStatus};

use crate::models::AdminError;

/// Verification queue and suspension of doctor accounts.
pub struct DoctorAdminService {
    supabase: SupabaseClient,
}

impl DoctorAdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Doctors waiting on review, oldest application first.
    pub async fn list_pending(&self) -> Result<Vec<UserRecord>, AdminError> {
        self.list_by_status(VerificationStatus::Pending, "created_at.asc").await
    }

    pub async fn list_verified(&self) -> Result<Vec<UserRecord>, AdminError> {
        self.list_by_status(VerificationStatus::Verified, "name.asc").await
    }

    async fn list_by_status(&self, status: VerificationStatus, order: &str) -> Result<Vec<UserRecord>, AdminError> {
        let path = format!(
            "/rest/v1/users?role=eq.{}&verification_status=eq.{}&order={}",
            UserRole::Doctor,
            status,
            order
        );
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    pub async fn update_verification(
        &self,
        doctor_id: Uuid,
        status: VerificationStatus,
    ) -> Result<UserRecord, AdminError> {
        if status == VerificationStatus::Pending {
            return Err(AdminError::InvalidRequest(
                "Verification status must be VERIFIED or REJECTED".to_string(),
            ));
        }

        let path = format!("/rest/v1/users?id=eq.{}&role=eq.{}", doctor_id, UserRole::Doctor);
        let updated = self.patch_status(&path, status).await?.ok_or(AdminError::DoctorNotFound)?;

        info!("Doctor {} verification set to {}", doctor_id, status);
        Ok(updated)
    }

    /// Suspend (VERIFIED to PENDING) or reinstate (PENDING to VERIFIED). The
    /// update is filtered on the current status so a doctor in any other
    /// state is left alone.
    pub async fn set_active(&self, doctor_id: Uuid, active: bool) -> Result<UserRecord, AdminError> {
        let (from, to) = if active {
            (VerificationStatus::Pending, VerificationStatus::Verified)
        } else {
            (VerificationStatus::Verified, VerificationStatus::Pending)
        };

        let path = format!(
            "/rest/v1/users?id=eq.{}&role=eq.{}&verification_status=eq.{}",
            doctor_id,
            UserRole::Doctor,
            from
        );

        match self.patch_status(&path, to).await? {
            Some(updated) => {
                info!("Doctor {} moved from {} to {}", doctor_id, from, to);
                Ok(updated)
            }
            None => {
                warn!("Doctor {} is not {}; cannot move to {}", doctor_id, from, to);
                Err(AdminError::InvalidTransition(format!(
                    "Doctor must be {} to become {}",
                    from, to
                )))
            }
        }
    }

    async fn patch_status(&self, path: &str, status: VerificationStatus) -> Result<Option<UserRecord>, AdminError> {
        let body = json!({
            "verification_status": status,
            "updated_at": Utc::now().to_rfc3339()
        });
        let rows: Vec<UserRecord> = self.supabase.request(Method::PATCH, path, Some(body)).await?;
        Ok(rows.into_iter().next())
    }
}

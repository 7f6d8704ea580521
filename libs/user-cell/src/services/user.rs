use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::auth::User;
use shared_models::user::{UserRecord, UserRole, VerificationStatus};

use crate::models::{OnboardingRequest, UserError};

pub struct UserService {
    supabase: SupabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<UserRecord>, UserError> {
        let path = format!("/rest/v1/users?auth_id=eq.{}", urlencoding::encode(auth_id));
        Ok(self.supabase.fetch_optional(&path).await?)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserRecord>, UserError> {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        Ok(self.supabase.fetch_optional(&path).await?)
    }

    /// The provisioned user behind a token subject.
    pub async fn current_user(&self, auth_id: &str) -> Result<UserRecord, UserError> {
        self.find_by_auth_id(auth_id).await?.ok_or(UserError::NotFound)
    }

    /// Load the caller and check their role.
    pub async fn require_role(&self, auth_id: &str, role: UserRole) -> Result<UserRecord, UserError> {
        let user = self.current_user(auth_id).await?;
        if user.role != role {
            warn!("User {} with role {} attempted a {} operation", user.id, user.role, role);
            return Err(UserError::Forbidden(format!("Only {} users can do this", role)));
        }
        Ok(user)
    }

    /// Return the caller's row, creating an unassigned one on first sight.
    pub async fn ensure_user(&self, identity: &User) -> Result<UserRecord, UserError> {
        if let Some(user) = self.find_by_auth_id(&identity.id).await? {
            return Ok(user);
        }

        debug!("Provisioning user for subject {}", identity.id);
        let now = Utc::now().to_rfc3339();
        let row = json!({
            "auth_id": identity.id,
            "email": identity.email.clone().unwrap_or_default(),
            "name": identity.name,
            "image_url": identity.image_url,
            "role": UserRole::Unassigned,
            "credits": 0,
            "created_at": now,
            "updated_at": now
        });

        let created: Result<Vec<UserRecord>, _> = self
            .supabase
            .request(Method::POST, "/rest/v1/users", Some(row))
            .await;

        match created {
            Ok(rows) => {
                let user = rows.into_iter().next().ok_or(UserError::NotFound)?;
                info!("Created user {} for subject {}", user.id, identity.id);
                Ok(user)
            }
            // Another request (or the user-sync webhook) created it first.
            Err(DatabaseError::Conflict(_)) => self.current_user(&identity.id).await,
            Err(e) => Err(e.into()),
        }
    }

    pub async fn complete_onboarding(
        &self,
        auth_id: &str,
        request: OnboardingRequest,
    ) -> Result<UserRecord, UserError> {
        request.validate()?;

        let user = self.current_user(auth_id).await?;
        if user.role != UserRole::Unassigned {
            return Err(UserError::AlreadyOnboarded);
        }

        let update = match &request {
            OnboardingRequest::Patient => json!({
                "role": UserRole::Patient,
                "updated_at": Utc::now().to_rfc3339()
            }),
            OnboardingRequest::Doctor { specialty, experience, credential_url, description } => json!({
                "role": UserRole::Doctor,
                "specialty": specialty,
                "experience": experience,
                "credential_url": credential_url.trim(),
                "description": description.trim(),
                "verification_status": VerificationStatus::Pending,
                "updated_at": Utc::now().to_rfc3339()
            }),
        };

        // The role filter makes a concurrent second onboarding match zero rows.
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.{}", user.id, UserRole::Unassigned);
        let rows: Vec<UserRecord> = self.supabase.request(Method::PATCH, &path, Some(update)).await?;
        let updated = rows.into_iter().next().ok_or(UserError::AlreadyOnboarded)?;

        info!("User {} onboarded as {}", updated.id, updated.role);
        Ok(updated)
    }
}

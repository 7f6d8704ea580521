use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::user::{DoctorProfile, UserRecord, UserRole, VerificationStatus};

use crate::models::AvailabilityError;

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Verified doctors, optionally narrowed to one specialty, by name.
    pub async fn list_doctors(&self, specialty: Option<&str>) -> Result<Vec<DoctorProfile>, AvailabilityError> {
        let mut path = format!(
            "/rest/v1/users?role=eq.{}&verification_status=eq.{}&order=name.asc",
            UserRole::Doctor,
            VerificationStatus::Verified
        );
        if let Some(specialty) = specialty.filter(|s| !s.trim().is_empty()) {
            path.push_str(&format!("&specialty=eq.{}", urlencoding::encode(specialty.trim())));
        }

        debug!("Listing doctors with specialty {:?}", specialty);
        let doctors: Vec<UserRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(doctors.into_iter().map(DoctorProfile::from).collect())
    }

    /// A doctor that patients may see and book; anyone else is reported missing.
    pub async fn get_verified_doctor(&self, doctor_id: Uuid) -> Result<UserRecord, AvailabilityError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.{}", doctor_id, UserRole::Doctor);
        let doctor: Option<UserRecord> = self.supabase.fetch_optional(&path).await?;

        doctor
            .filter(UserRecord::is_verified_doctor)
            .ok_or(AvailabilityError::DoctorNotFound)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<DoctorProfile, AvailabilityError> {
        self.get_verified_doctor(doctor_id).await.map(DoctorProfile::from)
    }
}

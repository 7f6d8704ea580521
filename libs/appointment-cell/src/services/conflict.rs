use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::scheduling::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;

pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Scheduled appointments of the doctor that overlap `[start, end)`.
    pub async fn find_conflicts(
        &self,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Checking conflicts for doctor {} from {} to {}", doctor_id, start_time, end_time);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.{}&start_time=lt.{}&end_time=gt.{}",
            doctor_id,
            AppointmentStatus::Scheduled,
            end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            start_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let existing: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        let conflicts = conflicting(existing, start_time, end_time);

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected for doctor {} - {} conflicting appointments",
                doctor_id,
                conflicts.len()
            );
        }
        Ok(conflicts)
    }

    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<bool, AppointmentError> {
        Ok(!self.find_conflicts(doctor_id, start_time, end_time).await?.is_empty())
    }
}

/// Keep the appointments that actually hold time inside `[start, end)`.
pub fn conflicting(appointments: Vec<Appointment>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Appointment> {
    appointments
        .into_iter()
        .filter(|apt| apt.blocks_time() && apt.overlaps(start, end))
        .collect()
}

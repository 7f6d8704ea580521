use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::scheduling::{Appointment, AppointmentStatus, Availability};
use shared_models::user::{UserRecord, UserRole};
use user_cell::UserService;

use crate::models::{AvailabilityError, DaySlots, SetAvailabilityRequest};
use crate::services::doctor::DoctorService;
use crate::services::slots::{expand_slots, validate_window, SLOT_MINUTES};

pub const DEFAULT_SLOT_DAYS: u32 = 4;
pub const MAX_SLOT_DAYS: u32 = 14;

pub struct AvailabilityService {
    supabase: SupabaseClient,
    users: UserService,
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            users: UserService::new(config),
            doctors: DoctorService::new(config),
        }
    }

    async fn require_verified_doctor(&self, auth_id: &str) -> Result<UserRecord, AvailabilityError> {
        let doctor = self.users.require_role(auth_id, UserRole::Doctor).await?;
        if !doctor.is_verified_doctor() {
            return Err(AvailabilityError::NotVerified);
        }
        Ok(doctor)
    }

    /// Replace the caller's daily window.
    pub async fn set_availability(
        &self,
        auth_id: &str,
        request: SetAvailabilityRequest,
    ) -> Result<Availability, AvailabilityError> {
        validate_window(request.start_time, request.end_time)?;
        let doctor = self.require_verified_doctor(auth_id).await?;

        debug!("Setting availability for doctor {}", doctor.id);

        let now = Utc::now().to_rfc3339();
        let rows: Vec<Availability> = self
            .supabase
            .upsert(
                "availabilities",
                "doctor_id",
                json!({
                    "doctor_id": doctor.id,
                    "start_time": request.start_time.format("%H:%M:%S").to_string(),
                    "end_time": request.end_time.format("%H:%M:%S").to_string(),
                    "updated_at": now
                }),
            )
            .await?;

        let availability = rows.into_iter().next().ok_or(AvailabilityError::DoctorNotFound)?;
        info!(
            "Doctor {} available {} - {}",
            doctor.id, availability.start_time, availability.end_time
        );
        Ok(availability)
    }

    pub async fn get_availability(&self, doctor_id: Uuid) -> Result<Option<Availability>, AvailabilityError> {
        let path = format!("/rest/v1/availabilities?doctor_id=eq.{}", doctor_id);
        Ok(self.supabase.fetch_optional(&path).await?)
    }

    pub async fn get_own_availability(&self, auth_id: &str) -> Result<Option<Availability>, AvailabilityError> {
        let doctor = self.users.require_role(auth_id, UserRole::Doctor).await?;
        self.get_availability(doctor.id).await
    }

    /// Scheduled appointments of a doctor overlapping `[from, to)`.
    pub async fn scheduled_appointments(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AvailabilityError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.{}&start_time=lt.{}&end_time=gt.{}&order=start_time.asc",
            doctor_id,
            AppointmentStatus::Scheduled,
            to.to_rfc3339_opts(SecondsFormat::Secs, true),
            from.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    /// Open slots for today and the following days, grouped by date.
    ///
    /// Slots that have already started are left out.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<DaySlots>, AvailabilityError> {
        let days = days.unwrap_or(DEFAULT_SLOT_DAYS).clamp(1, MAX_SLOT_DAYS);

        let doctor = self.doctors.get_verified_doctor(doctor_id).await?;
        let Some(window) = self.get_availability(doctor.id).await? else {
            debug!("Doctor {} has no availability window", doctor.id);
            return Ok(Vec::new());
        };

        let first_day = now.date_naive();
        let range_start = first_day.and_time(chrono::NaiveTime::MIN).and_utc();
        let range_end = range_start + Duration::days(days as i64);
        let booked = self.scheduled_appointments(doctor.id, range_start, range_end).await?;

        let mut result = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = first_day + Duration::days(offset as i64);
            let slots = expand_slots(window.start_time, window.end_time, date, &booked, SLOT_MINUTES)?
                .into_iter()
                .filter(|slot| slot.start_time > now)
                .collect();
            result.push(DaySlots { date, slots });
        }

        debug!(
            "Doctor {} has {} open slots over {} days",
            doctor.id,
            result.iter().map(|d| d.slots.len()).sum::<usize>(),
            days
        );
        Ok(result)
    }
}

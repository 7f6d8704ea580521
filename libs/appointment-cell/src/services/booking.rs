// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use credit_cell::APPOINTMENT_CREDIT_COST;
use doctor_cell::{candidate_slots, AvailabilityService, DoctorService, Slot, SLOT_MINUTES};
use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::scheduling::{Appointment, AppointmentStatus};
use shared_models::user::UserRole;
use user_cell::UserService;

use crate::models::{AppointmentError, BookAppointmentRequest, BookingReceipt};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    users: UserService,
    doctors: DoctorService,
    availability: AvailabilityService,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&supabase)),
            lifecycle_service: AppointmentLifecycleService::new(),
            users: UserService::new(config),
            doctors: DoctorService::new(config),
            availability: AvailabilityService::new(config),
            supabase,
        }
    }

    // ==========================================================================
    // BOOKING
    // ==========================================================================

    /// Book one slot with a verified doctor, paying with the patient's credits.
    pub async fn book_appointment(
        &self,
        auth_id: &str,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingReceipt, AppointmentError> {
        let patient = self.users.require_role(auth_id, UserRole::Patient).await?;
        info!("Booking appointment for patient {} with doctor {}", patient.id, request.doctor_id);

        validate_booking_times(request.start_time, request.end_time, now)?;
        let description = normalize_description(request.description.as_deref())?;

        let doctor = self.doctors.get_verified_doctor(request.doctor_id).await?;
        let window = self
            .availability
            .get_availability(doctor.id)
            .await?
            .ok_or_else(|| AppointmentError::InvalidTime("Doctor has not published availability".to_string()))?;

        let slot = Slot {
            start_time: request.start_time,
            end_time: request.end_time,
        };
        let grid = candidate_slots(
            window.start_time,
            window.end_time,
            request.start_time.date_naive(),
            SLOT_MINUTES,
        )?;
        if !grid.contains(&slot) {
            return Err(AppointmentError::InvalidTime(
                "Requested time is not one of the doctor's slots".to_string(),
            ));
        }

        if self
            .conflict_service
            .has_conflict(doctor.id, request.start_time, request.end_time)
            .await?
        {
            return Err(AppointmentError::ConflictDetected);
        }

        if patient.credits < APPOINTMENT_CREDIT_COST {
            warn!("Patient {} has {} credits, booking needs {}", patient.id, patient.credits, APPOINTMENT_CREDIT_COST);
            return Err(AppointmentError::InsufficientCredits {
                required: APPOINTMENT_CREDIT_COST,
                available: patient.credits,
            });
        }

        // Overlap and balance are checked again inside the transaction; the
        // exclusion constraint on appointments reports a lost race as 409.
        let receipt: BookingReceipt = self
            .supabase
            .rpc(
                "book_appointment",
                json!({
                    "p_patient_id": patient.id,
                    "p_doctor_id": doctor.id,
                    "p_start": request.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "p_end": request.end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "p_description": description,
                    "p_cost": APPOINTMENT_CREDIT_COST
                }),
            )
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => AppointmentError::ConflictDetected,
                DatabaseError::Rejected(_) => AppointmentError::InsufficientCredits {
                    required: APPOINTMENT_CREDIT_COST,
                    available: patient.credits,
                },
                other => AppointmentError::Database(other),
            })?;

        info!(
            "Appointment {} booked, patient {} balance now {}",
            receipt.appointment.id, patient.id, receipt.balance
        );
        Ok(receipt)
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub async fn list_appointments(
        &self,
        auth_id: &str,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let user = self.users.current_user(auth_id).await?;

        let mut path = match user.role {
            UserRole::Patient => format!("/rest/v1/appointments?patient_id=eq.{}", user.id),
            UserRole::Doctor => format!("/rest/v1/appointments?doctor_id=eq.{}", user.id),
            UserRole::Admin => "/rest/v1/appointments?select=*".to_string(),
            UserRole::Unassigned => {
                return Err(AppointmentError::Forbidden(
                    "Complete onboarding to see appointments".to_string(),
                ))
            }
        };
        if let Some(status) = status {
            path.push_str(&format!("&status=eq.{}", status));
        }
        path.push_str("&order=start_time.asc");

        debug!("Listing appointments for {} user {}", user.role, user.id);
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    pub async fn get_appointment(&self, auth_id: &str, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let user = self.users.current_user(auth_id).await?;
        let appointment = self.fetch_appointment(appointment_id).await?;

        if !appointment.involves(user.id) && user.role != UserRole::Admin {
            return Err(AppointmentError::Forbidden(
                "Not authorized to view this appointment".to_string(),
            ));
        }
        Ok(appointment)
    }

    // ==========================================================================
    // LIFECYCLE
    // ==========================================================================

    /// Cancel and refund. Either participant or an admin may cancel.
    pub async fn cancel_appointment(&self, auth_id: &str, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(auth_id, appointment_id).await?;
        self.lifecycle_service.validate_cancellation(&appointment)?;

        let cancelled: Appointment = self
            .supabase
            .rpc(
                "cancel_appointment",
                json!({
                    "p_appointment_id": appointment.id,
                    "p_refund": APPOINTMENT_CREDIT_COST
                }),
            )
            .await
            .map_err(|e| match e {
                // Completed or cancelled by someone else since it was read.
                DatabaseError::Rejected(_) => {
                    AppointmentError::Validation("Appointment is no longer scheduled".to_string())
                }
                other => AppointmentError::Database(other),
            })?;

        info!("Appointment {} cancelled and {} credits refunded", cancelled.id, APPOINTMENT_CREDIT_COST);
        Ok(cancelled)
    }

    pub async fn complete_appointment(
        &self,
        auth_id: &str,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.load_for_doctor(auth_id, appointment_id).await?;
        self.lifecycle_service.validate_completion(&appointment, now)?;

        // The status filter turns a concurrent cancel into an empty update.
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment.id,
            AppointmentStatus::Scheduled
        );
        let rows: Vec<Appointment> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(json!({
                    "status": AppointmentStatus::Completed,
                    "updated_at": now.to_rfc3339()
                })),
            )
            .await?;

        let completed = rows.into_iter().next().ok_or(AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Completed,
        })?;
        info!("Appointment {} completed", completed.id);
        Ok(completed)
    }

    pub async fn update_notes(
        &self,
        auth_id: &str,
        appointment_id: Uuid,
        notes: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.load_for_doctor(auth_id, appointment_id).await?;
        self.lifecycle_service.validate_notes_edit(&appointment)?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        let rows: Vec<Appointment> = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(json!({
                    "notes": notes.trim(),
                    "updated_at": Utc::now().to_rfc3339()
                })),
            )
            .await?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    async fn fetch_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.supabase
            .fetch_optional(&path)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// The caller must be the doctor the appointment is booked with.
    async fn load_for_doctor(
        &self,
        auth_id: &str,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let doctor = self.users.require_role(auth_id, UserRole::Doctor).await?;
        let appointment = self.fetch_appointment(appointment_id).await?;
        if appointment.doctor_id != doctor.id {
            return Err(AppointmentError::Forbidden(
                "Only the attending doctor can do this".to_string(),
            ));
        }
        Ok(appointment)
    }
}

/// Shape checks that need no database: ordering, future start and one slot
/// of length.
pub fn validate_booking_times(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppointmentError> {
    if start_time >= end_time {
        return Err(AppointmentError::InvalidTime("Start must be before end".to_string()));
    }
    if start_time <= now {
        return Err(AppointmentError::InvalidTime("Appointments must be booked in the future".to_string()));
    }
    if end_time - start_time != Duration::minutes(SLOT_MINUTES) {
        return Err(AppointmentError::InvalidTime(format!(
            "Appointments last exactly {} minutes",
            SLOT_MINUTES
        )));
    }
    Ok(())
}

fn normalize_description(description: Option<&str>) -> Result<Option<String>, AppointmentError> {
    let Some(text) = description.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppointmentError::Validation(format!(
            "Description is limited to {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(Some(text.to_string()))
}

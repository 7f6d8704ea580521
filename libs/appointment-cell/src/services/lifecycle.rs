use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use shared_models::scheduling::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;

/// Status rules for appointments. Everything here is pure; persistence lives
/// in the booking service.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// SCHEDULED is the only non-terminal state.
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current_status {
            AppointmentStatus::Scheduled => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }
        Ok(())
    }

    /// A consultation is completed by its doctor once its slot is over.
    pub fn validate_completion(&self, appointment: &Appointment, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        self.validate_status_transition(appointment.status, AppointmentStatus::Completed)?;
        if now < appointment.end_time {
            return Err(AppointmentError::NotFinished);
        }
        Ok(())
    }

    pub fn validate_cancellation(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        self.validate_status_transition(appointment.status, AppointmentStatus::Cancelled)
    }

    /// Notes stay editable after completion so the doctor can finish the record.
    pub fn validate_notes_edit(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::NotesLocked(appointment.status));
        }
        Ok(())
    }
}

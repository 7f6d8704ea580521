pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AvailabilityError, DaySlots, SetAvailabilityRequest, Slot};
pub use services::slots::{candidate_slots, expand_slots, validate_window, SLOT_MINUTES};
pub use services::{AvailabilityService, DoctorService};

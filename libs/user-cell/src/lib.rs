pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{OnboardingRequest, UserError, VET_SPECIALTIES};
pub use services::UserService;

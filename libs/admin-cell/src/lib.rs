pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AdminError, Dashboard, DashboardTotals, DayBucket};
pub use services::dashboard::{bucket_by_day, DashboardService};
pub use services::doctors::DoctorAdminService;

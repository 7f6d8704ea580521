pub mod dashboard;
pub mod doctors;

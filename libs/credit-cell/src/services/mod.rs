pub mod allocation;
pub mod credits;
pub mod plans;

pub use credits::CreditService;

pub mod auth;
pub mod chat;
pub mod credits;
pub mod error;
pub mod scheduling;
pub mod user;

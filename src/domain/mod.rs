//! Domain models for the users service.

pub mod user;

pub use user::User;

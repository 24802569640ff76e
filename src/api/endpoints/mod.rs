pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod patients;
pub mod records;
pub mod users;

pub mod appointment;
pub mod medical_record;
pub mod patient;
pub mod user;

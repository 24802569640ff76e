pub mod appointment;
pub mod enums;
pub mod medical_record;
pub mod patient;
pub mod user;

pub use appointment::Appointment;
pub use enums::Role;
pub use medical_record::{MedicalRecord, MedicalRecordWithPatient};
pub use patient::Patient;
pub use user::User;

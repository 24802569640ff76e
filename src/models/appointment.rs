use serde::Serialize;

/// Scheduled appointment. Patient and doctor are display names, not ids;
/// date/time are stored as ISO-like text so lexicographic order matches
/// chronological order.
#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

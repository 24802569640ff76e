use serde::Serialize;

/// One clinical visit entry tied to a patient.
///
/// `patient_id` is not verified at insert time; a dangling reference is
/// possible and surfaces only when joined.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: String,
    pub visit_date: String,
    pub created_at: String,
}

/// Record joined to its patient for list views.
#[derive(Debug, Clone, Serialize)]
pub struct MedicalRecordWithPatient {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub patient_name: String,
}

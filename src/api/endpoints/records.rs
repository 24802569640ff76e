//! Medical record endpoints. Reads go through the patient join, so records
//! pointing at a deleted patient never surface here.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::db::repository::medical_record::{self, MedicalRecordFields};
use crate::db::repository::patient;
use crate::models::{MedicalRecord, MedicalRecordWithPatient, Patient};

use super::patients::SearchParams;

#[derive(Deserialize)]
pub struct RecordForm {
    pub patient_id: i64,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    #[serde(default)]
    pub notes: String,
    pub visit_date: String,
}

impl RecordForm {
    fn as_fields(&self) -> MedicalRecordFields<'_> {
        MedicalRecordFields {
            patient_id: self.patient_id,
            doctor_name: &self.doctor_name,
            diagnosis: &self.diagnosis,
            treatment: &self.treatment,
            prescription: &self.prescription,
            notes: &self.notes,
            visit_date: &self.visit_date,
        }
    }
}

#[derive(Serialize)]
pub struct RecordsPage {
    pub records: Vec<MedicalRecordWithPatient>,
    pub search: String,
    pub notice: Option<Notice>,
}

/// `GET /medical_records?search=` — joined rows, newest visit first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let records = medical_record::list_records(&conn, params.search.as_deref())
        .map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(RecordsPage {
            records,
            search: params.search.unwrap_or_default(),
            notice: flash,
        }),
    ))
}

#[derive(Serialize)]
pub struct AddRecordPage {
    pub page: &'static str,
    /// For the patient selector.
    pub patients: Vec<Patient>,
    pub notice: Option<Notice>,
}

/// `GET /add_medical_record` — creation form with the patient roster.
pub async fn add_form(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let patients = patient::list_patients(&conn, None).map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(AddRecordPage {
            page: "add_medical_record",
            patients,
            notice: flash,
        }),
    ))
}

/// `POST /add_medical_record` — the patient id is taken as given, dangling
/// or not.
pub async fn create(
    State(ctx): State<ApiContext>,
    Form(form): Form<RecordForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    medical_record::insert_record(&conn, &form.as_fields())
        .map_err(ApiError::db("/add_medical_record"))?;

    Ok(notice::redirect_with_notice(
        "/medical_records",
        Notice::success("Medical record added successfully!"),
    ))
}

#[derive(Serialize)]
pub struct ViewRecordPage {
    pub record: MedicalRecordWithPatient,
    pub notice: Option<Notice>,
}

/// `GET /view_medical_record/:id` — a single record with its patient name.
pub async fn view(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let record = medical_record::get_record(&conn, id).map_err(ApiError::db("/medical_records"))?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(ViewRecordPage {
            record,
            notice: flash,
        }),
    ))
}

#[derive(Serialize)]
pub struct EditRecordPage {
    pub record: MedicalRecord,
    pub patients: Vec<Patient>,
    pub notice: Option<Notice>,
}

/// `GET /edit_medical_record/:id` — prefill reads the raw row, so even an
/// orphaned record stays editable.
pub async fn edit_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let record =
        medical_record::get_record_raw(&conn, id).map_err(ApiError::db("/medical_records"))?;
    let patients = patient::list_patients(&conn, None).map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(EditRecordPage {
            record,
            patients,
            notice: flash,
        }),
    ))
}

/// `POST /edit_medical_record/:id` — full-row overwrite.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Form(form): Form<RecordForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    medical_record::update_record(&conn, id, &form.as_fields())
        .map_err(ApiError::db("/medical_records"))?;

    Ok(notice::redirect_with_notice(
        "/medical_records",
        Notice::success("Medical record updated successfully!"),
    ))
}

/// `GET /delete_medical_record/:id` — unconditional.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    medical_record::delete_record(&conn, id).map_err(ApiError::db("/medical_records"))?;

    Ok(notice::redirect_with_notice(
        "/medical_records",
        Notice::success("Medical record deleted successfully!"),
    ))
}

#[derive(Serialize)]
pub struct PatientHistoryPage {
    pub patient: Patient,
    pub records: Vec<MedicalRecord>,
    pub notice: Option<Notice>,
}

/// `GET /patient_history/:patient_id` — every visit for one patient, newest
/// first. A missing patient bounces to the registry list.
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let (patient, records) = medical_record::patient_history(&conn, patient_id)
        .map_err(ApiError::db("/view_patients"))?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(PatientHistoryPage {
            patient,
            records,
            notice: flash,
        }),
    ))
}

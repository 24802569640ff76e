//! Patient registry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::db::repository::patient::{self, PatientFields};
use crate::models::Patient;

#[derive(Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub phone: String,
}

impl PatientForm {
    fn as_fields(&self) -> PatientFields<'_> {
        PatientFields {
            name: &self.name,
            age: self.age,
            gender: &self.gender,
            address: &self.address,
            phone: &self.phone,
        }
    }
}

#[derive(Serialize)]
pub struct RegisterPage {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

/// `GET /register_patient` — registration form payload.
pub async fn register_form(headers: HeaderMap) -> Response {
    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    notice::page(
        consumed,
        Json(RegisterPage {
            page: "register_patient",
            notice: flash,
        }),
    )
}

/// `POST /register_patient` — pure insert, no dedup check.
pub async fn register(
    State(ctx): State<ApiContext>,
    Form(form): Form<PatientForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    // Insert failures bounce to the index page, not the list
    patient::insert_patient(&conn, &form.as_fields()).map_err(ApiError::db("/"))?;

    Ok(notice::redirect_with_notice(
        "/view_patients",
        Notice::success("Patient registered successfully!"),
    ))
}

#[derive(Serialize)]
pub struct PatientsPage {
    pub patients: Vec<Patient>,
    pub search: String,
    pub notice: Option<Notice>,
}

/// `GET /view_patients?search=` — name/phone substring search, or all.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let patients = patient::list_patients(&conn, params.search.as_deref())
        .map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(PatientsPage {
            patients,
            search: params.search.unwrap_or_default(),
            notice: flash,
        }),
    ))
}

#[derive(Serialize)]
pub struct UpdatePatientPage {
    pub patient: Patient,
    pub notice: Option<Notice>,
}

/// `GET /update_patient/:id` — edit form prefill.
pub async fn update_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let patient = patient::get_patient(&conn, id).map_err(ApiError::db("/view_patients"))?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(UpdatePatientPage {
            patient,
            notice: flash,
        }),
    ))
}

/// `POST /update_patient/:id` — full-row overwrite.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Form(form): Form<PatientForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    patient::update_patient(&conn, id, &form.as_fields())
        .map_err(ApiError::db("/view_patients"))?;

    Ok(notice::redirect_with_notice(
        "/view_patients",
        Notice::success("Patient updated successfully!"),
    ))
}

/// `GET /delete_patient/:id` — unconditional; does not cascade to medical
/// records.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    patient::delete_patient(&conn, id).map_err(ApiError::db("/view_patients"))?;

    Ok(notice::redirect_with_notice(
        "/view_patients",
        Notice::success("Patient deleted successfully!"),
    ))
}

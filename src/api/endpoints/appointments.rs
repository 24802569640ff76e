//! Appointment book endpoints. Patient and doctor are free text by design;
//! nothing here validates them against the patient registry.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::db::repository::appointment::{self, AppointmentFields};
use crate::models::Appointment;

use super::patients::SearchParams;

#[derive(Deserialize)]
pub struct AppointmentForm {
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

impl AppointmentForm {
    fn as_fields(&self) -> AppointmentFields<'_> {
        AppointmentFields {
            patient_name: &self.patient_name,
            doctor_name: &self.doctor_name,
            date: &self.date,
            time: &self.time,
        }
    }
}

#[derive(Serialize)]
pub struct BookingPage {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

/// `GET /book_appointment` — booking form payload.
pub async fn book_form(headers: HeaderMap) -> Response {
    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    notice::page(
        consumed,
        Json(BookingPage {
            page: "book_appointment",
            notice: flash,
        }),
    )
}

/// `POST /book_appointment`.
pub async fn book(
    State(ctx): State<ApiContext>,
    Form(form): Form<AppointmentForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    // Insert failures bounce to the index page, not the list
    appointment::insert_appointment(&conn, &form.as_fields()).map_err(ApiError::db("/"))?;

    Ok(notice::redirect_with_notice(
        "/view_appointments",
        Notice::success("Appointment booked successfully!"),
    ))
}

#[derive(Serialize)]
pub struct AppointmentsPage {
    pub appointments: Vec<Appointment>,
    pub search: String,
    pub notice: Option<Notice>,
}

/// `GET /view_appointments?search=` — newest date first, then latest time.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let appointments = appointment::list_appointments(&conn, params.search.as_deref())
        .map_err(ApiError::internal)?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(AppointmentsPage {
            appointments,
            search: params.search.unwrap_or_default(),
            notice: flash,
        }),
    ))
}

#[derive(Serialize)]
pub struct UpdateAppointmentPage {
    pub appointment: Appointment,
    pub notice: Option<Notice>,
}

/// `GET /update_appointment/:id` — edit form prefill.
pub async fn update_form(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    let appointment = appointment::get_appointment(&conn, id)
        .map_err(ApiError::db("/view_appointments"))?;

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(UpdateAppointmentPage {
            appointment,
            notice: flash,
        }),
    ))
}

/// `POST /update_appointment/:id` — full-row overwrite.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Form(form): Form<AppointmentForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    appointment::update_appointment(&conn, id, &form.as_fields())
        .map_err(ApiError::db("/view_appointments"))?;

    Ok(notice::redirect_with_notice(
        "/view_appointments",
        Notice::success("Appointment updated successfully!"),
    ))
}

/// `GET /delete_appointment/:id` — unconditional.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;
    appointment::delete_appointment(&conn, id).map_err(ApiError::db("/view_appointments"))?;

    Ok(notice::redirect_with_notice(
        "/view_appointments",
        Notice::success("Appointment deleted successfully!"),
    ))
}

//! Public index and the post-login dashboard.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::cookies::{cookie_value, SESSION_COOKIE};
use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::db::repository::{appointment, patient};
use crate::models::Appointment;
use crate::session::Session;

/// Number of staffed doctors shown on the dashboard. Fixed value carried
/// over from the original deployment; there is no doctors table.
const TOTAL_DOCTORS: i64 = 3;

const RECENT_APPOINTMENTS: i64 = 5;

#[derive(Serialize)]
pub struct IndexPage {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

/// `GET /` — dashboard when signed in, public index otherwise.
pub async fn index(State(ctx): State<ApiContext>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        if ctx.session(&token)?.is_some() {
            return Ok(notice::redirect("/dashboard"));
        }
    }

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(IndexPage {
            page: "index",
            notice: flash,
        }),
    ))
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub total_appointments: i64,
    pub total_doctors: i64,
    pub recent_appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct DashboardPage {
    pub user: Session,
    pub stats: DashboardStats,
    pub notice: Option<Notice>,
}

/// `GET /dashboard` — system statistics for the signed-in user.
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;

    let stats = DashboardStats {
        total_patients: patient::count_patients(&conn).map_err(ApiError::internal)?,
        total_appointments: appointment::count_appointments(&conn).map_err(ApiError::internal)?,
        total_doctors: TOTAL_DOCTORS,
        recent_appointments: appointment::recent_appointments(&conn, RECENT_APPOINTMENTS)
            .map_err(ApiError::internal)?,
    };

    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    Ok(notice::page(
        consumed,
        Json(DashboardPage {
            user: session,
            stats,
            notice: flash,
        }),
    ))
}

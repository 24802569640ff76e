//! Login / logout. The only operations that create or destroy sessions.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::cookies::{self, SESSION_COOKIE};
use crate::api::error::ApiError;
use crate::api::notice::{self, Notice};
use crate::api::types::ApiContext;
use crate::auth;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginPage {
    pub page: &'static str,
    pub notice: Option<Notice>,
}

/// `GET /login` — login page payload.
pub async fn login_form(headers: HeaderMap) -> Response {
    let flash = notice::take(&headers);
    let consumed = flash.is_some();
    notice::page(
        consumed,
        Json(LoginPage {
            page: "login",
            notice: flash,
        }),
    )
}

/// `POST /login` — verify credentials and open a session.
pub async fn login(
    State(ctx): State<ApiContext>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let conn = ctx.open_db()?;

    let session = auth::authenticate(&conn, &form.username, &form.password)
        .map_err(ApiError::db("/login"))?;

    match session {
        Some(session) => {
            tracing::info!(username = %session.username, role = %session.role, "login");
            let token = ctx
                .sessions
                .lock()
                .map_err(|_| ApiError::Internal("session lock".into()))?
                .create(session);

            let mut response =
                notice::redirect_with_notice("/dashboard", Notice::success("Login successful!"));
            response
                .headers_mut()
                .append(SET_COOKIE, cookies::set_cookie(SESSION_COOKIE, &token));
            Ok(response)
        }
        None => {
            tracing::debug!(username = %form.username, "login rejected");
            Ok(notice::redirect_with_notice(
                "/login",
                Notice::error("Invalid username or password."),
            ))
        }
    }
}

/// `GET /logout` — destroy the session unconditionally; always succeeds.
pub async fn logout(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = cookies::cookie_value(&headers, SESSION_COOKIE) {
        ctx.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?
            .destroy(&token);
    }

    let mut response =
        notice::redirect_with_notice("/login", Notice::info("You have been logged out."));
    response
        .headers_mut()
        .append(SET_COOKIE, cookies::clear_cookie(SESSION_COOKIE));
    Ok(response)
}

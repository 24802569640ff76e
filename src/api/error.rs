//! Web-level errors. Gate failures and service failures surface to the
//! browser as a redirect plus flash notice; only programming errors become
//! a bare 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::notice::{redirect_with_notice, Notice};
use crate::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No valid session — back to the login page.
    #[error("Authentication required")]
    LoginRequired,
    /// Valid session, wrong role. Redirects to the dashboard, not the login
    /// page: the user is authenticated, just not authorized.
    #[error("Admin access required")]
    AdminRequired,
    #[error("{message}")]
    NotFound { message: String, redirect: &'static str },
    /// Service failure surfaced as a flash notice on `redirect`.
    #[error("{message}")]
    Notice { message: String, redirect: &'static str },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a store failure to a user-visible notice redirecting to
    /// `redirect`. Used at the service boundary of mutating handlers.
    pub fn db(redirect: &'static str) -> impl Fn(DatabaseError) -> ApiError {
        move |err| match err {
            DatabaseError::NotFound { entity, .. } => ApiError::NotFound {
                message: format!("{} not found!", capitalize(entity)),
                redirect,
            },
            DatabaseError::Conflict(_) => ApiError::Notice {
                message: "Username already exists!".to_string(),
                redirect,
            },
            other => ApiError::Notice {
                message: format!("Error: {other}"),
                redirect,
            },
        }
    }

    /// Map a store failure on a read-only page to a 500; there is no
    /// sensible page to bounce the user to.
    pub fn internal(err: DatabaseError) -> ApiError {
        ApiError::Internal(err.to_string())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Structured body for errors that do not redirect.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::LoginRequired => redirect_with_notice(
                "/login",
                Notice::error("Please log in to access this page."),
            ),
            ApiError::AdminRequired => redirect_with_notice(
                "/dashboard",
                Notice::error("Admin access required."),
            ),
            ApiError::NotFound { message, redirect }
            | ApiError::Notice { message, redirect } => {
                redirect_with_notice(redirect, Notice::error(message))
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                let body = ErrorBody {
                    error: ErrorDetail {
                        code: "INTERNAL",
                        message: "An internal error occurred".to_string(),
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

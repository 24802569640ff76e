//! Session gate middleware.
//!
//! Resolves the `sid` cookie against the session store and injects the
//! `Session` into request extensions for downstream handlers. Two levels:
//! `require_session` (any signed-in user) and `require_admin` (admin role).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::cookies::{cookie_value, SESSION_COOKIE};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Role;
use crate::session::Session;

/// Require a signed-in user. Missing or stale sessions bounce to the login
/// page with a notice.
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match gate(req, next, false).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

/// Require an admin. An authenticated non-admin is redirected to the
/// dashboard (not the login page) with a permission notice.
pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match gate(req, next, true).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn gate(
    mut req: Request<axum::body::Body>,
    next: Next,
    admin_only: bool,
) -> Result<Response, ApiError> {
    let session = resolve_session(&req)?;

    if admin_only && session.role != Role::Admin {
        tracing::debug!(username = %session.username, "admin gate rejected");
        return Err(ApiError::AdminRequired);
    }

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

fn resolve_session(req: &Request<axum::body::Body>) -> Result<Session, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token =
        cookie_value(req.headers(), SESSION_COOKIE).ok_or(ApiError::LoginRequired)?;

    ctx.session(&token)?.ok_or(ApiError::LoginRequired)
}

//! Flash notices: one-shot user-visible messages carried across a redirect
//! in a short-lived cookie and embedded in the next page payload.

use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use serde::Serialize;

use super::cookies::{self, NOTICE_COOKIE};

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Severity::Success),
            "error" => Some(Severity::Error),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Cookie form: `<severity>.<base64url(message)>`.
    pub fn encode(&self) -> String {
        format!("{}.{}", self.severity.as_str(), B64.encode(&self.message))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (severity, message) = raw.split_once('.')?;
        let severity = Severity::parse(severity)?;
        let message = String::from_utf8(B64.decode(message).ok()?).ok()?;
        Some(Self { severity, message })
    }
}

/// Read the pending notice off the request, if any. The caller embeds it in
/// the page payload and clears it with [`page`].
pub fn take(headers: &HeaderMap) -> Option<Notice> {
    Notice::decode(&cookies::cookie_value(headers, NOTICE_COOKIE)?)
}

/// Wrap a page body, clearing the notice cookie when one was consumed.
pub fn page<T: IntoResponse>(consumed: bool, body: T) -> Response {
    let mut response = body.into_response();
    if consumed {
        response
            .headers_mut()
            .append(SET_COOKIE, cookies::clear_cookie(NOTICE_COOKIE));
    }
    response
}

/// 303 redirect carrying a flash notice for the next page.
pub fn redirect_with_notice(location: &str, notice: Notice) -> Response {
    redirect_response(location, Some(notice))
}

/// Plain 303 redirect.
pub fn redirect(location: &str) -> Response {
    redirect_response(location, None)
}

fn redirect_response(location: &str, notice: Option<Notice>) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(axum::http::header::LOCATION, location);
    if let Some(notice) = notice {
        builder = builder.header(SET_COOKIE, cookies::set_cookie(NOTICE_COOKIE, &notice.encode()));
    }
    builder
        .body(axum::body::Body::empty())
        .expect("static redirect response")
}

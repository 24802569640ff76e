//! Cookie plumbing for the session token and the flash notice. Values are
//! restricted to URL-safe base64 and dots, so no quoting is needed.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "sid";
pub const NOTICE_COOKIE: &str = "notice";

/// Extract a cookie value from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// `Set-Cookie` value for an HttpOnly, site-wide cookie.
pub fn set_cookie(name: &str, value: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax"))
        .expect("cookie values are header-safe")
}

/// `Set-Cookie` value that removes the cookie.
pub fn clear_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{name}=; Path=/; HttpOnly; Max-Age=0"))
        .expect("cookie values are header-safe")
}

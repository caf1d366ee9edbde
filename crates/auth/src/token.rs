//! Session token extraction from request headers

use axum::http::{header, HeaderMap};

/// Cookie holding the session token when no Authorization header is sent
const SESSION_COOKIE: &str = "session_token";

/// Pull the session token out of the request headers:
/// `Authorization: Bearer <token>` wins, then the `session_token` cookie.
pub(crate) fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix("Bearer "))
        {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

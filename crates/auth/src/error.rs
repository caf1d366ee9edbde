//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// No session token in the request headers
    MissingSession,
    /// Token did not resolve to a session
    UnknownSession,
    /// Session resolved but its expiry has passed
    ExpiredSession,
    /// Store I/O failed while resolving the session
    SessionLoadError,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSession
            | AuthError::UnknownSession
            | AuthError::ExpiredSession => StatusCode::UNAUTHORIZED,
            AuthError::SessionLoadError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match status {
            StatusCode::UNAUTHORIZED => "Unauthorized!",
            _ => "Internal Server Error!",
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

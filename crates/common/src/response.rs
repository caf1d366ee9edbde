//! Success envelope returned by every non-streaming endpoint

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pagination::PageMeta;

/// `{ success: true, data, message }`, plus `pagination` on list endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            pagination: None,
        }
    }

    pub fn paginated(data: T, message: impl Into<String>, pagination: PageMeta) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            pagination: Some(pagination),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

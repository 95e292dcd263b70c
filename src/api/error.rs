//! JSON error responses for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::errors::{ArchiveError, Error};

/// Error returned by the HTTP handlers, rendered as `{"error": "..."}` with a
/// matching status code.
#[derive(Debug)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Message sent to the client
    pub message: String,
}

impl ApiError {
    /// 400 Bad Request.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// 500 Internal Server Error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match &e {
            Error::Archive(
                archive_error @ (ArchiveError::CorruptArchive(_)
                | ArchiveError::NoTableFound
                | ArchiveError::TableTooLarge { .. }),
            ) => Self::bad_request(archive_error.to_string()),
            _ => {
                error!("Request failed: {}", e);
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

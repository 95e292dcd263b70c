//! Upload and download handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use super::{AppState, error::ApiError};
use crate::core::{
    archive::EXPORT_FILE_NAME,
    catalog,
    summary::{self, ImportResponse},
};

/// Multipart field that carries the uploaded bundle.
pub const UPLOAD_FIELD: &str = "file";

/// POST /upload
///
/// Imports a ZIP bundle sent either as the `file` field of a multipart form or as the
/// raw request body, and returns the import summary.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ImportResponse>, ApiError> {
    let bundle = read_bundle(request, state.max_upload_bytes).await?;
    if bundle.is_empty() {
        return Err(ApiError::bad_request("Missing upload: expected a ZIP archive"));
    }

    let outcome = catalog::import_bundle(&state.gateway, bundle, state.max_table_bytes).await?;
    Ok(Json(summary::compose(&outcome.summary)))
}

/// GET /download
///
/// Streams the whole catalog back as `data.zip`.
#[instrument(skip_all)]
pub async fn download(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let bundle = catalog::export_bundle(&state.gateway).await?;
    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bundle,
    )
        .into_response())
}

async fn read_bundle(request: Request, limit: usize) -> Result<Vec<u8>, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        let body = axum::body::to_bytes(request.into_body(), limit)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {e}")))?;
        return Ok(body.to_vec());
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            debug!("Reading upload from multipart field '{}'", UPLOAD_FIELD);
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::bad_request(format!(
        "Missing '{UPLOAD_FIELD}' field in multipart upload"
    )))
}

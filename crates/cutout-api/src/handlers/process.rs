//! Batch processing handler.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use cutout_core::AppError;
use cutout_processing::{BatchError, UploadItem};

use crate::error::{error_response, ErrorResponse, HttpAppError, ResponseFormat};
use crate::state::AppState;

/// Suggested filename for the returned archive.
pub const DOWNLOAD_FILENAME: &str = "processed_images.zip";

/// Process a batch of uploaded images
///
/// Accepts repeated multipart fields named `images`, removes the background
/// from each valid upload, and returns the results as a single zip archive.
/// Individual files that fail validation or processing are skipped; the
/// request only fails when nothing could be processed at all.
///
/// # Errors
/// - `AppError::BadRequest` - no files supplied or malformed multipart body
/// - `AppError::NoValidInput` - every supplied file was skipped
/// - `AppError::Internal` - archive assembly failure
#[utoipa::path(
    post,
    path = "/process",
    tag = "process",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip archive of processed images", content_type = "application/zip"),
        (status = 400, description = "No files uploaded or no valid images processed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "process_batch"))]
pub async fn process_images(
    State(state): State<Arc<AppState>>,
    format: ResponseFormat,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let mut items: Vec<UploadItem> = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("images") {
                    continue;
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) => items.push(UploadItem { filename, data }),
                    Err(e) => {
                        // Unreadable part: skip it, keep the batch alive
                        tracing::warn!(filename = %filename, error = %e, "Failed to read uploaded file");
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                // A part-less multipart body surfaces here as a parse error;
                // with nothing collected that is the no-files case, not a
                // malformed request.
                if items.is_empty() {
                    break;
                }
                return Ok(error_response(
                    AppError::BadRequest(format!("Malformed multipart body: {}", e)).into(),
                    format,
                ));
            }
        }
    }

    if items.is_empty() {
        return Ok(error_response(
            AppError::BadRequest("No files uploaded".to_string()).into(),
            format,
        ));
    }

    let submitted = items.len();
    let outcome = match state.processor.process(items).await {
        Ok(outcome) => outcome,
        Err(BatchError::NoValidInput) => {
            return Ok(error_response(AppError::NoValidInput.into(), format));
        }
        Err(BatchError::Archive(e)) => {
            return Ok(error_response(AppError::from(e).into(), format));
        }
    };

    tracing::info!(
        submitted,
        processed = outcome.entries.len(),
        skipped = submitted - outcome.entries.len(),
        archive_bytes = outcome.archive.len(),
        "Batch processed"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
        ],
        outcome.archive,
    )
        .into_response())
}

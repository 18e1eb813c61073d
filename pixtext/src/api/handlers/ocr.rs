use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::dto::UploadResponse;
use crate::api::extractors::{read_upload_field, skip_form_field, FORM_FIELD_BUDGET};
use crate::api::AppState;
use crate::error::{PixtextError, Result, ValidationError};
use crate::processing::UploadPart;

/// Multipart field names accepted for the image.
const FILE_FIELDS: [&str; 2] = ["file", "image"];

/// `POST /upload` and `POST /api/ocr`
///
/// Reads the first `file` (or `image`) field and runs it through the OCR
/// pipeline. Other fields before it are discarded within a small budget; the
/// rest of the body is never read.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let limit = state.config.upload.max_upload_bytes;

    let mut part: Option<UploadPart> = None;
    let mut skipped = 0usize;
    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        PixtextError::Validation(ValidationError::MalformedUpload(e.body_text()))
    })? {
        let name = field.name().unwrap_or("");
        if FILE_FIELDS.contains(&name) {
            part = Some(read_upload_field(&mut field, limit).await?);
            break;
        }
        skipped += skip_form_field(&mut field, FORM_FIELD_BUDGET - skipped, limit).await?;
    }

    let result = state.pipeline.run(part).await?;
    tracing::info!(
        detections = result.detections.len(),
        confidence = result.confidence,
        "OCR request completed"
    );

    Ok(Json(result.into()))
}

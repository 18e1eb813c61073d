use axum::extract::multipart::{Field, MultipartRejection};

use crate::error::{PixtextError, ValidationError};
use crate::processing::UploadPart;

/// Total bytes of non-file form fields read before the file field.
pub const FORM_FIELD_BUDGET: usize = 64 * 1024;

impl From<MultipartRejection> for PixtextError {
    fn from(rejection: MultipartRejection) -> Self {
        PixtextError::Validation(ValidationError::MalformedUpload(rejection.body_text()))
    }
}

/// Read a file field, stopping as soon as it grows past `limit` bytes.
///
/// This is the only size gate on uploads. Oversized payloads come back
/// flagged rather than as an error so the validator can still apply its check
/// order (filename and extension before size).
pub async fn read_upload_field(
    field: &mut Field<'_>,
    limit: usize,
) -> Result<UploadPart, PixtextError> {
    let file_name = field.file_name().map(str::to_string);
    let mut buffer = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        PixtextError::Validation(ValidationError::MalformedUpload(format!(
            "Failed to read file: {}",
            e.body_text()
        )))
    })? {
        if buffer.len() + chunk.len() > limit {
            return Ok(UploadPart::oversized(file_name));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(UploadPart {
        file_name,
        bytes: buffer.into(),
        exceeded: false,
    })
}

/// Discard a field that is not the upload, returning how many bytes it held.
///
/// Fails with `TooLarge` once more than `budget` bytes have been read.
pub async fn skip_form_field(
    field: &mut Field<'_>,
    budget: usize,
    upload_limit: usize,
) -> Result<usize, PixtextError> {
    let mut read = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        PixtextError::Validation(ValidationError::MalformedUpload(e.body_text()))
    })? {
        read += chunk.len();
        if read > budget {
            return Err(PixtextError::Validation(ValidationError::TooLarge {
                limit: upload_limit,
            }));
        }
    }
    Ok(read)
}

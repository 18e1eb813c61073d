use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rejections raised before any decode or engine work happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Unsupported file type '{extension}', allowed: {allowed}")]
    UnsupportedType { extension: String, allowed: String },

    #[error("File too large (max {limit} bytes)")]
    TooLarge { limit: usize },

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt image data: {0}")]
    CorruptData(String),
}

/// Memoized by the engine handle; every caller sees the same value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineInitError {
    #[error("OCR engine construction failed: {0}")]
    ConstructionFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineInitError),

    #[error("OCR engine failure: {0}")]
    EngineFailure(String),

    #[error("OCR operation timed out after {} seconds", .0.as_secs_f32())]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum PixtextError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Processing error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Processing error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl PixtextError {
    pub fn status(&self) -> StatusCode {
        match self {
            PixtextError::Validation(ValidationError::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            PixtextError::Validation(_) => StatusCode::BAD_REQUEST,
            PixtextError::Decode(_)
            | PixtextError::Extraction(_)
            | PixtextError::Io(_)
            | PixtextError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PixtextError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            PixtextError::Validation(e) => e.to_string(),
            PixtextError::Decode(_) | PixtextError::Extraction(_) => {
                tracing::warn!(error = %self, "OCR pipeline failed");
                self.to_string()
            }
            PixtextError::Io(_) | PixtextError::Server(_) => {
                tracing::error!(error = %self, "Internal error mapped to response");
                "Server error: an internal error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PixtextError>;

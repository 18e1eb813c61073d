use serde::Serialize;

use crate::ocr::{EngineStatus, ExtractionResult};

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub text: String,
    pub message: String,
    pub confidence: f32,
    /// Number of text regions the engine reported.
    pub detections: usize,
}

impl From<ExtractionResult> for UploadResponse {
    fn from(result: ExtractionResult) -> Self {
        let message = if result.is_empty() {
            "No text detected"
        } else {
            "Processed successfully"
        };

        Self {
            success: true,
            message: message.to_string(),
            confidence: result.confidence,
            detections: result.detections.len(),
            text: result.text,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    pub message: String,
    pub status: String,
    pub engine: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: EngineStatus,
}

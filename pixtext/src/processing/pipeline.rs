use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{OcrConfig, UploadConfig};
use crate::error::{PixtextError, Result};
use crate::ocr::{normalize, ExtractionResult, Extractor};

use super::spool::TransientArtifact;
use super::upload::UploadPart;
use super::validate::validate_upload;

/// Request-scoped OCR pipeline: validate, hold the artifact, normalize,
/// extract, release.
#[derive(Debug, Clone)]
pub struct OcrPipeline {
    upload: Arc<UploadConfig>,
    max_dimension: u32,
    quality: u8,
    extractor: Extractor,
}

impl OcrPipeline {
    pub fn new(upload: UploadConfig, ocr: &OcrConfig, extractor: Extractor) -> Self {
        Self {
            upload: Arc::new(upload),
            max_dimension: ocr.max_image_dimension,
            quality: ocr.reencode_quality,
            extractor,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    pub async fn run(&self, part: Option<UploadPart>) -> Result<ExtractionResult> {
        let upload = validate_upload(part, &self.upload)?;
        tracing::info!(
            file_name = %upload.file_name,
            bytes = upload.bytes.len(),
            "Upload accepted"
        );

        let spool_dir: Option<PathBuf> = self.upload.spool_dir.clone();
        let mut artifact = TransientArtifact::acquire(upload, spool_dir.as_deref())?;

        let outcome = self.process(&artifact).await;
        artifact.release();
        outcome
    }

    async fn process(&self, artifact: &TransientArtifact) -> Result<ExtractionResult> {
        let upload = artifact.load()?;
        let (max_dimension, quality) = (self.max_dimension, self.quality);

        let image = tokio::task::spawn_blocking(move || normalize(&upload, max_dimension, quality))
            .await
            .map_err(|e| PixtextError::Server(format!("Normalization task panicked: {e}")))??;

        let result = self.extractor.extract(image).await?;
        Ok(result)
    }
}

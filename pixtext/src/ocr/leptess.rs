use std::sync::Mutex;

use anyhow::{anyhow, Result};
use leptess::LepTess;

use crate::config::OcrConfig;
use crate::error::EngineInitError;

use super::normalize::NormalizedImage;
use super::recognizer::{parse_tsv, Recognizer};
use super::types::Detection;

/// In-process libtesseract. `LepTess` needs `&mut` for every call, so
/// invocations from concurrent requests are serialized on the mutex.
pub struct LeptessRecognizer {
    tesseract: Mutex<LepTess>,
}

impl LeptessRecognizer {
    pub fn new(config: &OcrConfig) -> std::result::Result<Self, EngineInitError> {
        let lt = LepTess::new(config.tessdata_dir.as_deref(), &config.languages).map_err(|e| {
            EngineInitError::ConstructionFailed(format!("Tesseract not available: {e}"))
        })?;
        Ok(Self {
            tesseract: Mutex::new(lt),
        })
    }
}

impl Recognizer for LeptessRecognizer {
    fn name(&self) -> &str {
        "leptess"
    }

    fn detect(&self, image: &NormalizedImage) -> Result<Vec<Detection>> {
        let mut lt = self
            .tesseract
            .lock()
            .map_err(|_| anyhow!("Tesseract handle poisoned by an earlier panic"))?;

        lt.set_image_from_mem(&image.encoded)
            .map_err(|e| anyhow!("Failed to set image: {e}"))?;
        let tsv = lt
            .get_tsv_text(0)
            .map_err(|e| anyhow!("Failed to extract text: {e}"))?;

        Ok(parse_tsv(&tsv))
    }
}

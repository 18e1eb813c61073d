use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::ExtractionError;

use super::engine::EngineHandle;
use super::normalize::NormalizedImage;
use super::types::{ExtractionResult, JoinPolicy};

/// Drives engine acquisition, invocation and result assembly.
#[derive(Debug, Clone)]
pub struct Extractor {
    engine: EngineHandle,
    join_policy: JoinPolicy,
    init_timeout: Duration,
    timeout: Duration,
}

impl Extractor {
    pub fn new(
        engine: EngineHandle,
        join_policy: JoinPolicy,
        init_timeout: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            join_policy,
            init_timeout,
            timeout,
        }
    }

    pub fn from_config(engine: EngineHandle, config: &OcrConfig) -> Self {
        Self::new(
            engine,
            config.join_policy,
            Duration::from_secs(config.init_timeout_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub async fn extract(
        &self,
        image: NormalizedImage,
    ) -> Result<ExtractionResult, ExtractionError> {
        let recognizer = match tokio::time::timeout(self.init_timeout, self.engine.acquire()).await
        {
            Ok(Ok(recognizer)) => recognizer,
            Ok(Err(e)) => return Err(ExtractionError::EngineUnavailable(e)),
            Err(_) => return Err(ExtractionError::Timeout(self.init_timeout)),
        };

        // The blocking call cannot be interrupted; on timeout it finishes in the background.
        let task = tokio::task::spawn_blocking(move || recognizer.detect(&image));
        let detections = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(detections))) => detections,
            Ok(Ok(Err(e))) => return Err(ExtractionError::EngineFailure(format!("{e:#}"))),
            Ok(Err(e)) => {
                return Err(ExtractionError::EngineFailure(format!(
                    "OCR task panicked: {e}"
                )))
            }
            Err(_) => return Err(ExtractionError::Timeout(self.timeout)),
        };

        let result = ExtractionResult::assemble(detections, self.join_policy);
        tracing::debug!(
            detections = result.detections.len(),
            confidence = result.confidence,
            "Extraction complete"
        );
        Ok(result)
    }
}

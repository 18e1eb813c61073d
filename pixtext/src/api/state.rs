use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{EngineHandle, Extractor};
use crate::processing::OcrPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The one process-wide engine handle; shared with the pipeline's extractor.
    pub engine: EngineHandle,
    pub pipeline: OcrPipeline,
}

impl AppState {
    pub fn new(config: Config, engine: EngineHandle) -> Self {
        let config = Arc::new(config);
        let extractor = Extractor::from_config(engine.clone(), &config.ocr);
        let pipeline = OcrPipeline::new(config.upload.clone(), &config.ocr, extractor);

        Self {
            config,
            engine,
            pipeline,
        }
    }
}

//! OCR (Optical Character Recognition) Module
//!
//! Turns a validated upload into text through three stages:
//! - `normalize` decodes and bounds the image (RGB, long edge ≤ max dimension,
//!   re-encoded as JPEG)
//! - `EngineHandle` lazily constructs the recognition engine once per process
//! - `Extractor` invokes the engine and assembles an `ExtractionResult`
//!
//! # Engines
//!
//! The engine is opaque behind the `Recognizer` trait. One is picked at startup
//! from `OCR_ENGINE`:
//! - `tesseract`: the `tesseract` binary over stdin/stdout (default)
//! - `leptess`: in-process libtesseract (cargo feature `leptess`)
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = EngineHandle::from_config(&config.ocr);
//! let extractor = Extractor::from_config(engine, &config.ocr);
//! let image = normalize(&upload, 400, 60)?;
//! let result = extractor.extract(image).await?;
//! ```

mod engine;
mod extract;
#[cfg(feature = "leptess")]
mod leptess;
mod normalize;
mod recognizer;
mod tesseract;
mod types;

pub use engine::{EngineFactory, EngineHandle, EngineState, EngineStatus};
pub use extract::Extractor;
pub use normalize::{normalize, NormalizedImage};
pub use recognizer::{parse_tsv, Recognizer};
pub use tesseract::TesseractCli;
pub use types::{Detection, ExtractionResult, JoinPolicy};

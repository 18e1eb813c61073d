//! pixtext: a small HTTP service that extracts text from uploaded images.
//!
//! Requests flow through [`processing::OcrPipeline`]: validate the upload,
//! hold it as a transient artifact, normalize the image, run the lazily
//! initialized recognition engine, and shape the detections into a result.

pub mod api;
pub mod config;
pub mod error;
pub mod ocr;
pub mod processing;

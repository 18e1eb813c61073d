mod pipeline;
mod spool;
mod upload;
mod validate;

pub use pipeline::OcrPipeline;
pub use spool::TransientArtifact;
pub use upload::{RawUpload, UploadPart};
pub use validate::validate_upload;

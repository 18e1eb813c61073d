mod health;
mod ocr;

pub use health::{health_check, index};
pub use ocr::upload;

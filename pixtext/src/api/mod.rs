mod dto;
mod extractors;
mod handlers;
mod routes;
mod state;

pub use dto::{HealthResponse, IndexResponse, UploadResponse};
pub use routes::create_router;
pub use state::AppState;

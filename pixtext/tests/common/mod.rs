// Shared helpers for the integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use pixtext::config::{Config, OcrConfig, ServerConfig, UploadConfig};
use pixtext::ocr::{Detection, EngineFactory, EngineHandle, NormalizedImage, Recognizer};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const BOUNDARY: &str = "pixtext-it-boundary";

/// Encode a striped test image in the given format.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x % 8 < 4 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), format)
        .unwrap_or_else(|e| panic!("Failed to encode {format:?} fixture: {e}"));
    output
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

pub fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(file_name: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("file", file_name, bytes)))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        upload: UploadConfig::default(),
        ocr: OcrConfig::default(),
    }
}

/// Recognizer that reports the dimensions it was handed, one line per call.
pub struct DimensionRecognizer {
    pub delay: Duration,
}

impl Recognizer for DimensionRecognizer {
    fn name(&self) -> &str {
        "dimensions"
    }

    fn detect(&self, image: &NormalizedImage) -> anyhow::Result<Vec<Detection>> {
        std::thread::sleep(self.delay);
        Ok(vec![
            Detection::new(format!("{}x{}", image.width(), image.height()), 0.9),
            Detection::new("  ", 0.1),
            Detection::new("done", 0.5),
        ])
    }
}

/// Engine handle whose factory counts constructions and takes `init_delay`.
pub fn counting_engine(
    recognizer: Arc<dyn Recognizer>,
    init_delay: Duration,
) -> (EngineHandle, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory: EngineFactory = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(init_delay);
        Ok(Arc::clone(&recognizer))
    });
    (EngineHandle::new("dimensions", factory), calls)
}

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::ocr::JoinPolicy;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated env var into trimmed, non-empty entries.
fn parse_env_list(var: &str, default: &[&str]) -> Vec<String> {
    match env::var(var) {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 3 * 1024 * 1024;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];
pub const DEFAULT_MAX_DIMENSION: u32 = 400;
pub const DEFAULT_REENCODE_QUALITY: u8 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    /// When set, uploads are spooled to a temp file here for the request's duration.
    pub spool_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// `tesseract` (CLI) or `leptess` (in-process, needs the `leptess` feature).
    pub engine: String,
    pub tesseract_bin: String,
    /// `+`-separated tesseract language packs, e.g. `eng+deu`.
    pub languages: String,
    pub tessdata_dir: Option<String>,
    pub max_image_dimension: u32,
    pub reencode_quality: u8,
    pub join_policy: JoinPolicy,
    pub timeout_secs: u64,
    pub init_timeout_secs: u64,
    pub warmup: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            spool_dir: None,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: "tesseract".to_string(),
            tesseract_bin: "tesseract".to_string(),
            languages: "eng".to_string(),
            tessdata_dir: None,
            max_image_dimension: DEFAULT_MAX_DIMENSION,
            reencode_quality: DEFAULT_REENCODE_QUALITY,
            join_policy: JoinPolicy::SpaceJoined,
            timeout_secs: 60,
            init_timeout_secs: 120,
            warmup: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut max_image_dimension = parse_env_or("OCR_MAX_DIMENSION", DEFAULT_MAX_DIMENSION);
        if max_image_dimension == 0 {
            tracing::warn!(
                "OCR_MAX_DIMENSION must be at least 1. Using default {}.",
                DEFAULT_MAX_DIMENSION
            );
            max_image_dimension = DEFAULT_MAX_DIMENSION;
        }

        let raw_quality: u8 = parse_env_or("OCR_REENCODE_QUALITY", DEFAULT_REENCODE_QUALITY);
        let reencode_quality = raw_quality.clamp(1, 100);
        if reencode_quality != raw_quality {
            tracing::warn!(
                "OCR_REENCODE_QUALITY {} out of range (1..=100). Clamped to {}.",
                raw_quality,
                reencode_quality
            );
        }

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 5000),
                cors_origins: parse_env_list("CORS_ALLOWED_ORIGINS", &["*"]),
            },
            upload: UploadConfig {
                max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                allowed_extensions: parse_env_list("ALLOWED_EXTENSIONS", DEFAULT_ALLOWED_EXTENSIONS)
                    .into_iter()
                    .map(|ext| ext.trim_start_matches('.').to_lowercase())
                    .collect(),
                spool_dir: env::var("UPLOAD_SPOOL_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
            },
            ocr: OcrConfig {
                engine: env::var("OCR_ENGINE").unwrap_or_else(|_| "tesseract".to_string()),
                tesseract_bin: env::var("OCR_TESSERACT_BIN")
                    .unwrap_or_else(|_| "tesseract".to_string()),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                tessdata_dir: env::var("OCR_TESSDATA_DIR").ok(),
                max_image_dimension,
                reencode_quality,
                join_policy: parse_env_or("OCR_JOIN_POLICY", JoinPolicy::SpaceJoined),
                timeout_secs: parse_env_or("OCR_TIMEOUT_SECS", 60),
                init_timeout_secs: parse_env_or("OCR_INIT_TIMEOUT_SECS", 120),
                warmup: parse_env_or("OCR_WARMUP", false),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const OCR_VARS: &[&str] = &[
        "OCR_MAX_DIMENSION",
        "OCR_REENCODE_QUALITY",
        "OCR_JOIN_POLICY",
        "OCR_ENGINE",
        "MAX_UPLOAD_BYTES",
        "ALLOWED_EXTENSIONS",
        "UPLOAD_SPOOL_DIR",
        "CORS_ALLOWED_ORIGINS",
        "PORT",
    ];

    fn clear_env() {
        for var in OCR_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.upload.max_upload_bytes, 3 * 1024 * 1024);
        assert!(config.upload.spool_dir.is_none());
        assert!(config.upload.allowed_extensions.contains(&"png".to_string()));
        assert!(config.upload.allowed_extensions.contains(&"jpeg".to_string()));
        assert_eq!(config.ocr.engine, "tesseract");
        assert_eq!(config.ocr.max_image_dimension, 400);
        assert_eq!(config.ocr.reencode_quality, 60);
        assert_eq!(config.ocr.join_policy, JoinPolicy::SpaceJoined);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("OCR_MAX_DIMENSION", "1200");
        std::env::set_var("OCR_JOIN_POLICY", "lines");
        std::env::set_var("MAX_UPLOAD_BYTES", "16777216");
        std::env::set_var("ALLOWED_EXTENSIONS", "PNG, .jpg ,");
        std::env::set_var("UPLOAD_SPOOL_DIR", "/tmp/pixtext-spool");
        std::env::set_var("PORT", "8080");

        let config = Config::default();
        assert_eq!(config.ocr.max_image_dimension, 1200);
        assert_eq!(config.ocr.join_policy, JoinPolicy::LineCleaned);
        assert_eq!(config.upload.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(
            config.upload.allowed_extensions,
            vec!["png".to_string(), "jpg".to_string()]
        );
        assert_eq!(
            config.upload.spool_dir,
            Some(PathBuf::from("/tmp/pixtext-spool"))
        );
        assert_eq!(config.server.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_quality_is_clamped() {
        clear_env();
        std::env::set_var("OCR_REENCODE_QUALITY", "0");
        assert_eq!(Config::default().ocr.reencode_quality, 1);

        std::env::set_var("OCR_REENCODE_QUALITY", "250");
        assert_eq!(Config::default().ocr.reencode_quality, 100);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_max_dimension_falls_back() {
        clear_env();
        std::env::set_var("OCR_MAX_DIMENSION", "0");
        assert_eq!(
            Config::default().ocr.max_image_dimension,
            DEFAULT_MAX_DIMENSION
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_value_uses_default() {
        clear_env();
        std::env::set_var("OCR_JOIN_POLICY", "zigzag");
        std::env::set_var("PORT", "not-a-port");

        let config = Config::default();
        assert_eq!(config.ocr.join_policy, JoinPolicy::SpaceJoined);
        assert_eq!(config.server.port, 5000);
        clear_env();
    }
}

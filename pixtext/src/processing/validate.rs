use crate::config::UploadConfig;
use crate::error::ValidationError;

use super::upload::{RawUpload, UploadPart};

/// Check an upload before any spooling, decoding or engine work.
///
/// Checks run in a fixed order (presence, filename, extension, size) and the
/// first violation wins.
pub fn validate_upload(
    part: Option<UploadPart>,
    config: &UploadConfig,
) -> Result<RawUpload, ValidationError> {
    let part = part.ok_or(ValidationError::MissingFile)?;

    let file_name = match part.file_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ValidationError::EmptyFilename),
    };

    // Whatever follows the last dot, so a bare `.png` still counts as png.
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !config.allowed_extensions.iter().any(|allowed| *allowed == extension) {
        return Err(ValidationError::UnsupportedType {
            extension,
            allowed: config.allowed_extensions.join(", "),
        });
    }

    if part.exceeded || part.bytes.len() > config.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            limit: config.max_upload_bytes,
        });
    }

    Ok(RawUpload {
        file_name,
        bytes: part.bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(max_upload_bytes: usize) -> UploadConfig {
        UploadConfig {
            max_upload_bytes,
            ..UploadConfig::default()
        }
    }

    #[test]
    fn test_missing_file() {
        let err = validate_upload(None, &config(1024)).unwrap_err();
        assert_eq!(err, ValidationError::MissingFile);
    }

    #[test]
    fn test_empty_or_absent_filename() {
        for name in [None, Some(""), Some("   ")] {
            let part = UploadPart {
                file_name: name.map(String::from),
                bytes: vec![1u8; 10].into(),
                exceeded: false,
            };
            let err = validate_upload(Some(part), &config(1024)).unwrap_err();
            assert_eq!(err, ValidationError::EmptyFilename);
        }
    }

    #[test]
    fn test_disallowed_extension() {
        for name in ["setup.exe", "notes.txt", "no_extension", "archive.png.zip"] {
            let err = validate_upload(Some(UploadPart::new(name, vec![0u8; 4])), &config(1024))
                .unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedType { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let upload =
            validate_upload(Some(UploadPart::new("Scan.JPEG", vec![0u8; 4])), &config(1024))
                .unwrap();
        assert_eq!(upload.file_name, "Scan.JPEG");
    }

    #[test]
    fn test_dotfile_name_uses_suffix_as_extension() {
        let upload =
            validate_upload(Some(UploadPart::new(".png", vec![0u8; 4])), &config(1024)).unwrap();
        assert_eq!(upload.file_name, ".png");

        let err = validate_upload(Some(UploadPart::new("png", vec![0u8; 4])), &config(1024))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_too_large() {
        let err = validate_upload(Some(UploadPart::new("a.png", vec![0u8; 11])), &config(10))
            .unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { limit: 10 });

        let err = validate_upload(
            Some(UploadPart::oversized(Some("a.png".to_string()))),
            &config(10),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::TooLarge { limit: 10 });
    }

    #[test]
    fn test_exactly_at_limit_is_accepted() {
        let upload =
            validate_upload(Some(UploadPart::new("a.png", vec![0u8; 10])), &config(10)).unwrap();
        assert_eq!(upload.bytes.len(), 10);
    }

    #[test]
    fn test_extension_checked_before_size() {
        let err = validate_upload(
            Some(UploadPart::new("payload.exe", vec![0u8; 4096])),
            &config(10),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                extension: "exe".to_string(),
                allowed: UploadConfig::default().allowed_extensions.join(", "),
            }
        );
    }

    #[test]
    fn test_filename_checked_before_extension() {
        let part = UploadPart {
            file_name: Some(String::new()),
            bytes: vec![0u8; 4096].into(),
            exceeded: true,
        };
        let err = validate_upload(Some(part), &config(10)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyFilename);
    }
}

use axum::body::Bytes;

/// A validated upload: the declared filename and its immutable bytes.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// What the HTTP layer read for the file field, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadPart {
    pub file_name: Option<String>,
    pub bytes: Bytes,
    /// Reading stopped because the payload went past the size limit.
    pub exceeded: bool,
}

impl UploadPart {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
            exceeded: false,
        }
    }

    pub fn oversized(file_name: Option<String>) -> Self {
        Self {
            file_name,
            bytes: Bytes::new(),
            exceeded: true,
        }
    }
}

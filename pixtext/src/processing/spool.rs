//! Scoped ownership of a request's upload artifact.
//!
//! By default the upload stays in memory. With a spool directory configured it
//! is written to a uniquely named temp file for the request's duration. Either
//! way `release` runs exactly once in effect: explicitly at the end of the
//! pipeline or from `Drop` on any early return.

use std::io::Write;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use tempfile::NamedTempFile;

use super::upload::RawUpload;

enum Held {
    Memory(RawUpload),
    Disk {
        file_name: String,
        file: NamedTempFile,
    },
    Released,
}

pub struct TransientArtifact {
    held: Held,
}

impl TransientArtifact {
    pub fn acquire(upload: RawUpload, spool_dir: Option<&Path>) -> std::io::Result<Self> {
        let held = match spool_dir {
            None => Held::Memory(upload),
            Some(dir) => {
                let suffix = Path::new(&upload.file_name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| format!(".{}", ext.to_lowercase()))
                    .unwrap_or_default();
                let mut file = tempfile::Builder::new()
                    .prefix("upload-")
                    .suffix(&suffix)
                    .tempfile_in(dir)?;
                file.write_all(&upload.bytes)?;
                file.flush()?;
                tracing::debug!(path = %file.path().display(), "Upload spooled to disk");
                Held::Disk {
                    file_name: upload.file_name,
                    file,
                }
            }
        };
        Ok(Self { held })
    }

    /// The upload's bytes, read back from disk when spooled.
    pub fn load(&self) -> std::io::Result<RawUpload> {
        match &self.held {
            Held::Memory(upload) => Ok(upload.clone()),
            Held::Disk { file_name, file } => Ok(RawUpload {
                file_name: file_name.clone(),
                bytes: Bytes::from(std::fs::read(file.path())?),
            }),
            Held::Released => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "upload artifact already released",
            )),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        match &self.held {
            Held::Disk { file, .. } => Some(file.path().to_path_buf()),
            _ => None,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self.held, Held::Released)
    }

    /// Idempotent; deletion failures are logged, never returned.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.held, Held::Released) {
            Held::Disk { file, .. } => {
                let path = file.path().to_path_buf();
                match file.close() {
                    Ok(()) => tracing::debug!(path = %path.display(), "Spooled upload removed"),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove spooled upload"
                    ),
                }
            }
            Held::Memory(_) | Held::Released => {}
        }
    }
}

impl Drop for TransientArtifact {
    fn drop(&mut self) {
        self.release();
    }
}

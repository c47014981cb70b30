/// Upload boundary
///
/// Turns candidate files into accepted items for the store. A file is
/// accepted when it fits under the size ceiling and its content sniffs as
/// an image; nothing else about the image is checked here.
use bytes::Bytes;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::state::data::ContentHandle;

/// Per-file ceiling (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// A file that passed the boundary checks, ready for `ItemStore::add`
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    pub name: String,
    pub mime: &'static str,
    pub content: ContentHandle,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("{name} is not an image")]
    NotAnImage { name: String },
    #[error("failed to read {}: {detail}", path.display())]
    Io { path: PathBuf, detail: String },
}

/// Outcome of importing a set of candidates
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub accepted: Vec<AcceptedFile>,
    pub rejected: Vec<UploadError>,
}

impl UploadReport {
    fn push(&mut self, result: Result<AcceptedFile, UploadError>) {
        match result {
            Ok(file) => self.accepted.push(file),
            Err(err) => {
                debug!(error = %err, "upload rejected");
                self.rejected.push(err);
            }
        }
    }
}

/// Accept an in-memory file
pub fn accept_bytes(
    name: impl Into<String>,
    bytes: impl Into<Bytes>,
    limits: &UploadLimits,
) -> Result<AcceptedFile, UploadError> {
    let name = name.into();
    let bytes = bytes.into();

    let size = bytes.len() as u64;
    if size > limits.max_bytes {
        return Err(UploadError::TooLarge {
            name,
            size,
            limit: limits.max_bytes,
        });
    }

    let mime = sniff_mime(&bytes).ok_or_else(|| UploadError::NotAnImage { name: name.clone() })?;

    Ok(AcceptedFile {
        name,
        mime,
        content: ContentHandle::new(bytes),
    })
}

/// Accept a file from disk, checking its size before reading it
pub fn accept_path(path: &Path, limits: &UploadLimits) -> Result<AcceptedFile, UploadError> {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let io_error = |err: std::io::Error| UploadError::Io {
        path: path.to_path_buf(),
        detail: err.to_string(),
    };

    let size = std::fs::metadata(path).map_err(io_error)?.len();
    if size > limits.max_bytes {
        return Err(UploadError::TooLarge {
            name,
            size,
            limit: limits.max_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(io_error)?;
    accept_bytes(name, bytes, limits)
}

pub fn accept_paths(paths: &[PathBuf], limits: &UploadLimits) -> UploadReport {
    let mut report = UploadReport::default();
    for path in paths {
        report.push(accept_path(path, limits));
    }
    report
}

/// Accept every image file under a folder, recursively
///
/// Files without an image extension are skipped, not rejected.
pub fn accept_folder(folder: &Path, limits: &UploadLimits) -> UploadReport {
    let mut report = UploadReport::default();

    for entry in WalkDir::new(folder)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || ImageFormat::from_path(path).is_err() {
            continue;
        }
        report.push(accept_path(path, limits));
    }

    info!(
        folder = %folder.display(),
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "folder scanned"
    );
    report
}

/// Read files off the UI thread
pub async fn import_paths(paths: Vec<PathBuf>, limits: UploadLimits) -> UploadReport {
    tokio::task::spawn_blocking(move || accept_paths(&paths, &limits))
        .await
        .unwrap_or_else(join_failure)
}

/// Walk a folder off the UI thread
pub async fn import_folder(folder: PathBuf, limits: UploadLimits) -> UploadReport {
    let path = folder.clone();
    tokio::task::spawn_blocking(move || accept_folder(&path, &limits))
        .await
        .unwrap_or_else(|e| UploadReport {
            accepted: Vec::new(),
            rejected: vec![UploadError::Io {
                path: folder,
                detail: e.to_string(),
            }],
        })
}

fn join_failure(err: tokio::task::JoinError) -> UploadReport {
    UploadReport {
        accepted: Vec::new(),
        rejected: vec![UploadError::Io {
            path: PathBuf::new(),
            detail: format!("import task failed: {err}"),
        }],
    }
}

/// MIME type from magic bytes, if the content is an image
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let mime = image::guess_format(bytes).ok()?.to_mime_type();
    mime.starts_with("image/").then_some(mime)
}

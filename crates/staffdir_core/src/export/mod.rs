//! Profile export to JSON and PDF documents.
//!
//! # Responsibility
//! - Produce downloadable artifacts for one staff record.
//! - Keep the PDF page layout pure so it can be checked without rendering.

pub mod json;
pub mod pdf;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
    Pdf(lopdf::Error),
    /// Serializing the finished PDF document failed.
    Render(std::io::Error),
    Photo(image::ImageError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write export `{}`: {source}", path.display())
            }
            Self::Encode(err) => write!(f, "failed to encode profile json: {err}"),
            Self::Pdf(err) => write!(f, "failed to render profile pdf: {err}"),
            Self::Render(err) => write!(f, "failed to serialize profile pdf: {err}"),
            Self::Photo(err) => write!(f, "failed to embed profile photo: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Pdf(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Photo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(value: lopdf::Error) -> Self {
        Self::Pdf(value)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(value: image::ImageError) -> Self {
        Self::Photo(value)
    }
}

/// Writes `bytes` to `dir/file_name`, creating `dir` when missing.
pub(crate) fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> ExportResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

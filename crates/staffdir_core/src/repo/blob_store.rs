//! Blob store contract and filesystem implementation for profile photos.
//!
//! # Responsibility
//! - Accept binary uploads under an object path and return a durable URL.
//! - Resolve previously returned URLs back to bytes (used by PDF export).
//!
//! # Invariants
//! - Photo object paths follow `staff-photos/{epoch_ms}-{file name}`.
//! - Object paths never escape the store root.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Object path prefix for staff photos.
pub const PHOTO_PREFIX: &str = "staff-photos";

const FILE_URL_SCHEME: &str = "file://";
const FALLBACK_FILE_NAME: &str = "photo";

static UNSAFE_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

pub type BlobResult<T> = Result<T, BlobError>;

#[derive(Debug)]
pub enum BlobError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Object path is empty, absolute or contains `..`.
    InvalidPath(String),
    /// URL was not issued by this store.
    UnsupportedUrl(String),
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "blob io failed at `{}`: {source}", path.display()),
            Self::InvalidPath(path) => write!(f, "invalid blob object path `{path}`"),
            Self::UnsupportedUrl(url) => write!(f, "unsupported blob url `{url}`"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Binary object storage returning retrievable URLs.
pub trait BlobStore {
    /// Stores `bytes` under `object_path` and returns the retrieval URL.
    fn put(&self, object_path: &str, bytes: &[u8]) -> BlobResult<String>;
    /// Fetches the bytes behind a URL returned by [`BlobStore::put`].
    fn get(&self, url: &str) -> BlobResult<Vec<u8>>;
}

/// Builds the photo object path from upload time and the original file name.
///
/// Directory parts of `original_name` are dropped and characters outside
/// `[A-Za-z0-9._-]` collapse to `_`.
pub fn photo_object_path(uploaded_at_ms: i64, original_name: &str) -> String {
    format!(
        "{PHOTO_PREFIX}/{uploaded_at_ms}-{}",
        sanitize_file_name(original_name)
    )
}

fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_NAME_CHARS_RE.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Filesystem blob store rooted at one directory, issuing `file://` URLs.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Opens (creating when missing) a blob root directory.
    pub fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| BlobError::Io {
            path: root.clone(),
            source,
        })?;
        let root = root.canonicalize().map_err(|source| BlobError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, object_path: &str) -> BlobResult<PathBuf> {
        let relative = Path::new(object_path);
        let is_plain = !object_path.trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(BlobError::InvalidPath(object_path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, object_path: &str, bytes: &[u8]) -> BlobResult<String> {
        let target = self.resolve(object_path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BlobError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&target, bytes).map_err(|source| BlobError::Io {
            path: target.clone(),
            source,
        })?;
        Ok(format!("{FILE_URL_SCHEME}{}", target.display()))
    }

    fn get(&self, url: &str) -> BlobResult<Vec<u8>> {
        let path = url
            .strip_prefix(FILE_URL_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| BlobError::UnsupportedUrl(url.to_string()))?;
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| BlobError::UnsupportedUrl(url.to_string()))?;
        let target = self.resolve(&relative.to_string_lossy())?;
        std::fs::read(&target).map_err(|source| BlobError::Io {
            path: target,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{photo_object_path, sanitize_file_name, BlobError, BlobStore, FsBlobStore};

    #[test]
    fn photo_path_uses_timestamp_and_original_name() {
        assert_eq!(
            photo_object_path(1_700_000_000_000, "me.jpg"),
            "staff-photos/1700000000000-me.jpg"
        );
    }

    #[test]
    fn sanitize_drops_directories_and_unsafe_characters() {
        assert_eq!(sanitize_file_name("../../etc/pass wd.png"), "pass_wd.png");
        assert_eq!(sanitize_file_name("C:\\Users\\a\\photo (1).jpg"), "photo_1_.jpg");
        assert_eq!(sanitize_file_name("..."), "photo");
        assert_eq!(sanitize_file_name(""), "photo");
    }

    #[test]
    fn put_then_get_returns_same_bytes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsBlobStore::open(dir.path()).expect("open store");

        let url = store
            .put("staff-photos/1-a.jpg", b"jpeg-bytes")
            .expect("put blob");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("staff-photos/1-a.jpg"));
        assert_eq!(store.get(&url).expect("get blob"), b"jpeg-bytes");
    }

    #[test]
    fn put_rejects_escaping_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsBlobStore::open(dir.path()).expect("open store");

        let err = store.put("../outside.jpg", b"x").expect_err("must reject");
        assert!(matches!(err, BlobError::InvalidPath(_)));
    }

    #[test]
    fn get_rejects_foreign_urls() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsBlobStore::open(dir.path()).expect("open store");

        let err = store
            .get("https://cdn.example.com/a.jpg")
            .expect_err("foreign url must fail");
        assert!(matches!(err, BlobError::UnsupportedUrl(_)));
    }
}

//! Error types for dataset processing and access.

use dentascan_data::{AnnotationError, MeshError, SamplingError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while turning one mesh file into a record. Always names the file.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("sampling failed for {}: {source}", .path.display())]
    Sampling {
        path: PathBuf,
        source: SamplingError,
    },

    #[error("annotation error for {}: {source}", .path.display())]
    Annotation {
        path: PathBuf,
        source: AnnotationError,
    },
}

impl ProcessError {
    pub(crate) fn sampling(path: &Path) -> impl FnOnce(SamplingError) -> Self {
        let path = path.to_path_buf();
        move |source| ProcessError::Sampling { path, source }
    }

    pub(crate) fn annotation(path: &Path) -> impl FnOnce(AnnotationError) -> Self {
        let path = path.to_path_buf();
        move |source| ProcessError::Annotation { path, source }
    }
}

/// Errors from dataset discovery, caching and indexed access.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(
        "raw data not found in {}; fetch and extract the archives listed by `dentascan archives`",
        .0.display()
    )]
    RawDataMissing(PathBuf),

    #[error("split directory {} does not exist", .0.display())]
    SplitDirMissing(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no cached record for '{key}' at {}", .path.display())]
    CacheEntryMissing { key: String, path: PathBuf },

    #[error("failed to decode cache entry {}: {source}", .path.display())]
    CorruptCacheEntry {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode cache entry {}: {source}", .path.display())]
    CacheEncode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| DatasetError::Io { path, source }
    }
}

//! Error types for the command line front end.

use dentascan_dataset::{DatasetError, ProcessError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("{} was rejected by the pre-filter", .0.display())]
    Rejected(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

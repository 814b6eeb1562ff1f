use std::path::PathBuf;

use crate::core::DetectError;
use crate::io::IoError;

/// Errors produced by the file-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum CropError {
    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Error type shared by every stage of the data-preparation pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::corpus::CaseKey;

/// Errors raised while loading, splitting, flattening or vectorizing a corpus.
///
/// All of them are terminal for a run: nothing is skipped or retried.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("loader: path {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("loader: no *.{extension} files found in {dir:?}")]
    EmptyDirectory { dir: PathBuf, extension: String },

    #[error("loader: malformed table {path:?}: {reason}")]
    MalformedTable { path: PathBuf, reason: String },

    #[error("loader: cannot list {dir:?}: {source}")]
    Discovery {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("loader: {path:?} maps to case '{key}', which an earlier file already claimed")]
    DuplicateCase { key: CaseKey, path: PathBuf },

    #[error("loader: extension must be 'csv' or 'tsv', got '{0}'")]
    UnsupportedExtension(String),

    #[error("loader: unknown text encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("splitter: train ratio must lie in [0, 1], got {0}")]
    InvalidRatio(f64),

    #[error("flattener: case '{key}' is not in the corpus")]
    KeyNotFound { key: CaseKey },

    #[error("vectorizer: invalid token pattern '{pattern}': {reason}")]
    InvalidTokenPattern { pattern: String, reason: String },

    #[error("vectorizer: the fitting partition is empty")]
    EmptyFittingSet,

    #[error("output: {0}")]
    Io(#[from] std::io::Error),

    #[error("output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    // Input preconditions: the corpus on disk is not what the recipe expects.
    #[error("Missing corpus directory: {0}")]
    MissingCorpusDirectory(PathBuf),
    #[error("Unexpected number of audio files. Expected: {expected}, found: {found}")]
    UnexpectedFileCount { expected: usize, found: usize },
    #[error("Malformed file name {name}: {reason}")]
    MalformedFileName { name: String, reason: String },
    #[error("Unexpected size for partition {partition}. Expected: {expected}, found: {found}")]
    UnexpectedPartitionSize {
        partition: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid manifest path extension: {0}")]
    InvalidPathExtension(PathBuf),
    // Manifest consistency
    #[error("Validation Error ({id}): {reason}")]
    Validation { id: String, reason: String },
    #[error("Duplicate manifest id: {0}")]
    DuplicateId(String),
    #[error("Parameter Error {0}")]
    ParameterError(String),
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    DecodeError(#[from] symphonia::core::errors::Error),
    #[error("Directory scan error: {0}")]
    WalkError(#[from] walkdir::Error),
    #[error("JSON Parse Error {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "downloader")]
    #[error("UrlParse Error {0}")]
    UrlParseError(#[from] url::ParseError),
    #[cfg(feature = "downloader")]
    #[error("Reqwest Error {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[cfg(feature = "downloader")]
    #[error("Download Error {0}")]
    DownloadError(String),
    #[cfg(feature = "downloader")]
    #[error("Download Aborted {0}")]
    DownloadAborted(String),
    #[cfg(feature = "downloader")]
    #[error("Archive Error {0}")]
    ArchiveError(String),
    #[cfg(feature = "downloader")]
    #[error("Archive entry escapes the destination directory: {0}")]
    PathTraversal(PathBuf),
}

impl RecipeError {
    /// True when the error was caused by bad input (the corpus, a file name, a manifest path)
    /// rather than by I/O or an internal inconsistency.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RecipeError::MissingCorpusDirectory(_)
                | RecipeError::UnexpectedFileCount { .. }
                | RecipeError::MalformedFileName { .. }
                | RecipeError::UnexpectedPartitionSize { .. }
                | RecipeError::InvalidPathExtension(_)
        )
    }

    pub(crate) fn validation(id: &str, reason: impl Into<String>) -> Self {
        RecipeError::Validation {
            id: id.to_owned(),
            reason: reason.into(),
        }
    }
}

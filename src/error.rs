//! Error types for loading inputs and persisting history.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a form or place record.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid form: {source}")]
    InvalidForm {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid place record: {source}")]
    InvalidPlace {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors from a snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write history {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt history {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no snapshot with id {id}")]
    NotFound { id: String },

    #[error("remote history {url}: {message}")]
    Remote { url: String, message: String },
}

impl StoreError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::Read { .. } | StoreError::Write { .. } | StoreError::Remote { .. } => 3,
            StoreError::Corrupt { .. } => 2,
            StoreError::NotFound { .. } => 1,
        }
    }
}

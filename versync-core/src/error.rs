//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

use crate::executor::ExecutionResult;

/// Errors produced by discovery, configuration, adapters and execution.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid version '{input}': {message}")]
    InvalidVersion { input: String, message: String },

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Manifest error for {manifest}: {message}")]
    Adapter { manifest: String, message: String },

    #[error("Operation failed for {module}: {message}")]
    Operation { module: String, message: String },

    #[error("Aborted after {module} failed: {message}")]
    FailFast {
        module: String,
        message: String,
        results: Vec<ExecutionResult>,
    },

    #[error("Executor error: {0}")]
    Executor(String),

    /// Results carry every module: finished ones as they ended, the rest
    /// as skipped. Empty when cancellation hit before any module was touched.
    #[error("Operation cancelled")]
    Cancelled { results: Vec<ExecutionResult> },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a cancellation error without any results.
    pub fn cancelled() -> Self {
        Error::Cancelled {
            results: Vec::new(),
        }
    }

    /// Results gathered before a fail-fast abort or a cancellation.
    pub fn partial_results(&self) -> Option<&[ExecutionResult]> {
        match self {
            Error::FailFast { results, .. } | Error::Cancelled { results } => Some(results),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "versync.toml".to_string(),
        }
    }
}

/// Result type used throughout versync.
pub type Result<T> = std::result::Result<T, Error>;

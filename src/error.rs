// src/error.rs

//! Error types for the debforge library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Library error type
#[derive(Error, Debug)]
pub enum Error {
    /// A file required by the package tree could not be created or opened
    #[error("Unable to create {what} \"{}\": {source}", path.display())]
    CreateError {
        what: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid path: {0}")]
    PathError(String),

    /// An external tool (dpkg, du) could not be run or exited non-zero
    #[error("Command failed: {0}")]
    CommandError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid distribution: {0}")]
    ValidationError(String),
}

impl Error {
    /// Build a `CreateError` for `path`
    pub fn create(what: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateError {
            what,
            path: path.into(),
            source,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

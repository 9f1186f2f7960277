//! Custom error types for the deployment pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("configuration error: {field}: {message}")]
    Config {
        field: &'static str,
        message: String,
    },

    #[error("directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    #[error("cannot read {path:?}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized, check token validity")]
    Unauthorized,

    #[error("Unknown error with status code {0}")]
    UnexpectedStatus(u16),
}

pub type Result<T> = std::result::Result<T, DeployError>;

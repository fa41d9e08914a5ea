use crate::issue::Report;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeymetaError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Validation Failed: {0}")]
    Invalid(#[from] Report),
}

impl KeymetaError {
    /// The validation report, if this error carries one.
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

pub type KmResult<T> = Result<T, KeymetaError>;

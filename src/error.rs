use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by snapshot loading, saved views and the CLI.
///
/// Grouping and filtering never fail; everything here comes from the
/// edges of the crate.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid message #{index} (id '{id}'): {source}")]
    InvalidRecord {
        index: usize,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value '{value}' for {field}")]
    InvalidSelector { field: &'static str, value: String },
    #[error("no saved view named '{0}'")]
    UnknownView(String),
    #[error("saved view name must not be empty")]
    InvalidViewName,
    #[error("no thread with key '{0}' in the filtered snapshot")]
    UnknownThread(String),
}

impl HubError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HubError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

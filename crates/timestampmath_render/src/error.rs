use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;
use timestampmath::TsMathError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid Arrow file {path}: {source}")]
    Arrow { path: PathBuf, source: ArrowError },
    #[error(transparent)]
    Engine(#[from] TsMathError),
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        RenderError::Json {
            path: path.into(),
            source,
        }
    }

    pub fn arrow(path: impl Into<PathBuf>, source: ArrowError) -> Self {
        RenderError::Arrow {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

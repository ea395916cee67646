use arrow::datatypes::DataType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TsMathError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("column {column} has {found} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("column {column} has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

impl TsMathError {
    pub fn type_mismatch(column: impl Into<String>, expected: DataType, found: &DataType) -> Self {
        TsMathError::TypeMismatch {
            column: column.into(),
            expected,
            found: found.clone(),
        }
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        TsMathError::InvalidParams(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, TsMathError>;

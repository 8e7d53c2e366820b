//! File- and schema-level failures. Any of these aborts the run before
//! aggregation; row-level problems are collected as
//! [`RowValidationError`](crate::types::RowValidationError) instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// No candidate encoding could decode the file
    #[error("could not decode input with any of: {}", .attempted.join(", "))]
    FileDecode { attempted: Vec<String> },

    #[error("unknown encoding label {0:?}")]
    UnknownEncoding(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("input has no data rows after the header")]
    EmptyInput,

    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

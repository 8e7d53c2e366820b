use realize_core::DonorRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why one data row was excluded from aggregation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("row {row_index} (line {line}): {field}: {reason}")]
pub struct RowValidationError {
    /// Zero-based position among the data rows
    pub row_index: usize,
    /// One-based line in the decoded source
    pub line: u64,
    /// Header name of the offending column
    pub field: String,
    pub reason: String,
}

/// Output of the row normalizer: accepted records plus diagnostics
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Accepted records in input order
    pub records: Vec<DonorRecord>,
    pub rejected: Vec<RowValidationError>,
    /// Subtotal/total lines from earlier runs that were skipped
    pub summary_rows_skipped: usize,
    /// Delimiter the file was read with
    pub delimiter: u8,
}

impl Normalized {
    pub fn accepted_count(&self) -> usize {
        self.records.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Data rows considered, accepted or not
    pub fn data_rows(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

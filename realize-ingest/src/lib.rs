//! realize-ingest: decoding, header detection and row normalization for
//! fundraising-campaign CSV exports.

pub mod columns;
pub mod decode;
pub mod error;
pub mod normalizer;
pub mod types;

pub use columns::{Column, ColumnMap, RawRow};
pub use decode::{Decoded, SourceEncoding, decode, read_and_decode};
pub use error::IngestError;
pub use normalizer::{NormalizeOptions, normalize, normalize_row, parse_age, parse_amount};
pub use types::{Normalized, RowValidationError};

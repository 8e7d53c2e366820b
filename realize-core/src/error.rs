//! Field-level parse failures shared by the typed record fields.

use thiserror::Error;

/// Why a single raw cell could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("value is empty")]
    Empty,

    #[error("expected WW/YYYY or KW WW, got {0:?}")]
    WeekPattern(String),

    #[error("week {0} is outside 1-53")]
    WeekOutOfRange(u32),

    #[error("week {0} has no year and none could be inferred from other rows")]
    MissingYear(u32),

    #[error("unrecognized interval {0:?}")]
    UnknownInterval(String),
}

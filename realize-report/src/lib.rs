//! realize-report: ordering, the formatted CSV emitter, weekly summary and
//! per-fundraiser breakdowns

pub mod breakdown;
pub mod csv_emitter;
pub mod report;
pub mod summary;

pub use breakdown::{FundraiserBreakdown, Period, month_label, write_breakdown_json};
pub use csv_emitter::{EmitOptions, OUTPUT_COLUMNS, emit_to_path, output_path_for, write_csv};
pub use report::{Report, sort_groups};
pub use summary::{WeekSummary, weekly_summary};

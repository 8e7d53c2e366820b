//! Row normalizer: decoded text in, typed donor records plus rejected-row
//! diagnostics out.
//!
//! File/schema problems (no header, missing columns, no data rows) abort
//! with an [`IngestError`]. A malformed row is recorded as a
//! [`RowValidationError`] and processing continues.

use std::str::FromStr;
use std::sync::LazyLock;

use csv::ReaderBuilder;
use realize_core::{CalendarWeek, DonorRecord, DonorStatus, FundraiserId, Interval, WeekLabel};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::columns::{Column, ColumnMap, RawRow};
use crate::error::{IngestError, Result};
use crate::types::{Normalized, RowValidationError};

/// Label of a subtotal / total line left by an earlier run or the export
/// tool: the whole cell is `Subtotal` or `Total`, optionally `Total: ...`.
static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(sub)?total(\s*:.*)?$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// `None` sniffs the delimiter from the text
    pub delimiter: Option<u8>,
    /// Year for `KW 18` labels when the file has no `WW/YYYY` label to
    /// infer it from
    pub default_year: Option<i32>,
    /// Inherit empty fundraiser id/name/week cells from the row above
    pub fill_down: bool,
    pub fundraiser_id_width: usize,
    /// Leading records searched for the header row
    pub header_scan_limit: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            default_year: None,
            fill_down: true,
            fundraiser_id_width: 5,
            header_scan_limit: 10,
        }
    }
}

/// Pick `;`, tab or `,` from the first non-empty lines.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).take(5).collect();
    if sample.iter().any(|l| l.contains(';')) {
        b';'
    } else if sample.iter().any(|l| l.contains('\t')) {
        b'\t'
    } else {
        b','
    }
}

/// Parse an age cell: a non-negative integer, optionally with a zero
/// fraction (`45.0`) as written by spreadsheet tools.
pub fn parse_age(raw: &str) -> std::result::Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("value is empty".to_string());
    }

    let (whole, frac) = match raw.find(['.', ',']) {
        Some(pos) => (&raw[..pos], &raw[pos + 1..]),
        None => (raw, ""),
    };
    let digits_only = !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || !frac.bytes().all(|b| b == b'0') {
        return Err(format!("expected a non-negative integer, got {raw:?}"));
    }

    whole
        .parse()
        .map_err(|_| format!("age {raw:?} is out of range"))
}

/// Parse a yearly amount in euros. Accepts `.` or `,` as decimal
/// separator; when both appear the rightmost one is the decimal separator.
pub fn parse_amount(raw: &str) -> std::result::Result<Decimal, String> {
    let trimmed = raw.trim();
    let mut s = trimmed
        .trim_start_matches('€')
        .trim_end_matches('€')
        .trim()
        .to_string();
    if s.to_ascii_lowercase().ends_with("eur") {
        s.truncate(s.len() - 3);
    }
    s.retain(|c| !c.is_whitespace());

    if s.is_empty() {
        return Err("value is empty".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("amount must not be negative, got {trimmed:?}"));
    }

    let normalized = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        (None, Some(_)) => s.replace(',', ""),
        (Some(_), None) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s,
    };

    Decimal::from_str(&normalized).map_err(|_| format!("expected a decimal amount, got {trimmed:?}"))
}

fn reject(row_index: usize, line: u64, column: Column, reason: impl Into<String>) -> RowValidationError {
    RowValidationError {
        row_index,
        line,
        field: column.header().to_string(),
        reason: reason.into(),
    }
}

/// Validate one raw row into a typed record. `anchor` settles the year of
/// an undated week label.
pub fn normalize_row(
    raw: &RawRow,
    row_index: usize,
    line: u64,
    anchor: Option<CalendarWeek>,
    opts: &NormalizeOptions,
) -> std::result::Result<DonorRecord, RowValidationError> {
    let fail = |column: Column, reason: String| reject(row_index, line, column, reason);

    let fundraiser_id = FundraiserId::normalize(raw.get(Column::FundraiserId), opts.fundraiser_id_width)
        .map_err(|e| fail(Column::FundraiserId, e.to_string()))?;

    let fundraiser_name = raw.get(Column::FundraiserName).to_string();
    if fundraiser_name.is_empty() {
        return Err(fail(Column::FundraiserName, "value is empty".to_string()));
    }

    let week_label = raw.get(Column::CalendarWeek).to_string();
    let calendar_week = WeekLabel::parse(&week_label)
        .and_then(|label| label.resolve(anchor, opts.default_year))
        .map_err(|e| fail(Column::CalendarWeek, e.to_string()))?;

    let donor_ref = raw.get(Column::PublicRefId).to_string();
    if donor_ref.is_empty() {
        return Err(fail(Column::PublicRefId, "value is empty".to_string()));
    }

    let age = parse_age(raw.get(Column::Age)).map_err(|r| fail(Column::Age, r))?;

    let interval_label = raw.get(Column::Interval).to_string();
    let interval =
        Interval::parse(&interval_label).map_err(|e| fail(Column::Interval, e.to_string()))?;

    let amount_yearly =
        parse_amount(raw.get(Column::AmountYearly)).map_err(|r| fail(Column::AmountYearly, r))?;

    let status_label = raw.get(Column::Status).to_string();
    let status =
        DonorStatus::parse(&status_label).map_err(|e| fail(Column::Status, e.to_string()))?;

    Ok(DonorRecord {
        row_index,
        fundraiser_id,
        fundraiser_name,
        calendar_week,
        week_label,
        donor_ref,
        age,
        interval,
        interval_label,
        amount_yearly,
        status,
        status_label,
    })
}

/// Carries fundraiser cells down over rows that leave them blank.
#[derive(Default)]
struct FillDown {
    id: String,
    name: String,
    week: String,
}

impl FillDown {
    fn apply(&mut self, row: &mut RawRow) {
        for (column, last) in [
            (Column::FundraiserId, &mut self.id),
            (Column::FundraiserName, &mut self.name),
            (Column::CalendarWeek, &mut self.week),
        ] {
            if row.get(column).is_empty() {
                if !last.is_empty() {
                    row.set(column, last.clone());
                }
            } else {
                *last = row.get(column).to_string();
            }
        }
    }
}

/// A summary line carries a `Subtotal`/`Total` label and no donor data.
/// Donor rows are never skipped here, whatever their names say.
fn is_summary_row(row: &RawRow) -> bool {
    let no_donor_data = [Column::Age, Column::Interval, Column::AmountYearly, Column::Status]
        .iter()
        .all(|c| row.get(*c).is_empty());
    no_donor_data
        && [Column::FundraiserId, Column::FundraiserName, Column::PublicRefId]
            .iter()
            .any(|c| SUMMARY_RE.is_match(row.get(*c)))
}

fn dated_week(row: &RawRow) -> Option<CalendarWeek> {
    WeekLabel::parse(row.get(Column::CalendarWeek))
        .ok()
        .and_then(|label| label.dated())
}

/// Normalize a whole decoded file.
pub fn normalize(text: &str, opts: &NormalizeOptions) -> Result<Normalized> {
    let delimiter = opts.delimiter.unwrap_or_else(|| sniff_delimiter(text));
    debug!(delimiter = %char::from(delimiter), "reading CSV");

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();

    // Skip title/blank lines until the header row
    let mut columns = None;
    for _ in 0..opts.header_scan_limit {
        let Some(record) = records.next() else { break };
        let record = record?;
        if ColumnMap::header_score(&record) >= 2 {
            columns = Some(ColumnMap::from_header(&record)?);
            break;
        }
    }
    let columns = columns.ok_or_else(|| {
        IngestError::MissingColumn(Column::ALL.iter().map(|c| c.header().to_string()).collect())
    })?;

    let mut out = Normalized {
        delimiter,
        ..Normalized::default()
    };
    let mut fill = FillDown::default();
    let mut data_rows: Vec<(RawRow, u64)> = Vec::new();

    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut raw = columns.extract(&record);

        if raw.is_blank() {
            continue;
        }
        if is_summary_row(&raw) {
            debug!(line, "skipping summary row");
            out.summary_rows_skipped += 1;
            continue;
        }
        if opts.fill_down {
            fill.apply(&mut raw);
        }
        data_rows.push((raw, line));
    }

    if data_rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    // Undated labels take their year from the nearest dated label above,
    // or from the first dated label in the file.
    let mut anchor = data_rows.iter().find_map(|(raw, _)| dated_week(raw));

    for (row_index, (raw, line)) in data_rows.iter().enumerate() {
        match normalize_row(raw, row_index, *line, anchor, opts) {
            Ok(rec) => out.records.push(rec),
            Err(rejected) => {
                warn!(
                    row_index = rejected.row_index,
                    line = rejected.line,
                    field = %rejected.field,
                    reason = %rejected.reason,
                    "rejected row"
                );
                out.rejected.push(rejected);
            }
        }
        if let Some(week) = dated_week(raw) {
            anchor = Some(week);
        }
    }

    info!(
        accepted = out.accepted_count(),
        rejected = out.rejected_count(),
        summary_rows_skipped = out.summary_rows_skipped,
        "normalized input"
    );
    Ok(out)
}

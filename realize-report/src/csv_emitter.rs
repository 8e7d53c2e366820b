//! Formatted CSV output: one row per accepted donor in output order, each
//! fundraiser/week block closed by a subtotal row.
//!
//! Numbers use the comma as decimal separator. Fundraiser ids are written
//! as the strings they were normalized to, so leading zeros survive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use realize_core::{FundraiserWeekGroup, GroupMember, european_decimal, percentage};
use tracing::{debug, info};

use crate::report::Report;

/// Column schema of the formatted file
pub const OUTPUT_COLUMNS: [&str; 11] = [
    "Fundraiser ID",
    "Fundraiser Name",
    "Calendar week",
    "Public RefID",
    "Age",
    "Interval",
    "Amount Yearly",
    "status_agency",
    "points",
    "realization_rate",
    "bonus_status",
];

/// Marker written in the `Public RefID` column of subtotal rows
pub const SUBTOTAL_LABEL: &str = "Subtotal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub delimiter: u8,
    /// First preamble line, e.g. `WoVi_CW_Formatted_2025-07-30`; `None`
    /// writes no preamble
    pub title: Option<String>,
    pub utf8_bom: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            title: None,
            utf8_bom: false,
        }
    }
}

fn donor_row(group: &FundraiserWeekGroup, member: &GroupMember) -> Vec<String> {
    let rec = &member.scored.record;
    vec![
        group.fundraiser_id().to_string(),
        rec.fundraiser_name.clone(),
        rec.week_label.clone(),
        rec.donor_ref.clone(),
        rec.age.to_string(),
        rec.interval_label.clone(),
        european_decimal(rec.amount_yearly),
        rec.status_label.clone(),
        european_decimal(member.effective_points),
        String::new(),
        String::new(),
    ]
}

fn subtotal_row(group: &FundraiserWeekGroup) -> Vec<String> {
    vec![
        group.fundraiser_id().to_string(),
        group.fundraiser_name().to_string(),
        group.calendar_week().to_string(),
        SUBTOTAL_LABEL.to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        european_decimal(group.subtotal_points()),
        percentage(group.realization_ratio()),
        if group.bonus_eligible() { "eligible" } else { "not-eligible" }.to_string(),
    ]
}

/// Write the formatted CSV for `report` into `out`.
pub fn write_csv<W: Write>(report: &Report, mut out: W, opts: &EmitOptions) -> Result<()> {
    if opts.utf8_bom {
        out.write_all("\u{feff}".as_bytes())?;
    }

    let mut wtr = WriterBuilder::new()
        .delimiter(opts.delimiter)
        .flexible(false)
        .from_writer(out);

    if let Some(title) = &opts.title {
        let mut first = vec![String::new(); OUTPUT_COLUMNS.len()];
        first[0] = title.clone();
        wtr.write_record(&first)?;
        wtr.write_record(vec![""; OUTPUT_COLUMNS.len()])?;
    }

    wtr.write_record(OUTPUT_COLUMNS)?;

    let mut rows = 0usize;
    for group in report.groups() {
        for member in group.members() {
            wtr.write_record(donor_row(group, member))?;
            rows += 1;
        }
        wtr.write_record(subtotal_row(group))?;
        rows += 1;
    }

    wtr.flush()?;
    debug!(rows, "wrote formatted rows");
    Ok(())
}

/// `<dir>/<stem><suffix>.csv` beside the input file
pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{suffix}.csv"))
}

/// Write the formatted CSV to `path`.
pub fn emit_to_path(report: &Report, path: &Path, opts: &EmitOptions) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(report, BufWriter::new(file), opts)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote formatted CSV");
    Ok(())
}

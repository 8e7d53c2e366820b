//! Required input columns and typed access to their cells.
//!
//! Column order in the source is not significant and extra columns are
//! ignored: a [`ColumnMap`] records where each required column sits, and a
//! [`RawRow`] holds the raw cell text per required column.

use std::collections::HashMap;

use csv::StringRecord;

use crate::error::{IngestError, Result};

/// The required columns of a campaign export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FundraiserId,
    FundraiserName,
    CalendarWeek,
    PublicRefId,
    Age,
    Interval,
    AmountYearly,
    Status,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::FundraiserId,
        Column::FundraiserName,
        Column::CalendarWeek,
        Column::PublicRefId,
        Column::Age,
        Column::Interval,
        Column::AmountYearly,
        Column::Status,
    ];

    /// Header text as it appears in exports
    pub fn header(&self) -> &'static str {
        match self {
            Column::FundraiserId => "Fundraiser ID",
            Column::FundraiserName => "Fundraiser Name",
            Column::CalendarWeek => "Calendar week",
            Column::PublicRefId => "Public RefID",
            Column::Age => "Age",
            Column::Interval => "Interval",
            Column::AmountYearly => "Amount Yearly",
            Column::Status => "status_agency",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

fn clean_header(cell: &str) -> &str {
    cell.trim_start_matches('\u{feff}').trim()
}

/// Positions of the required columns within a header record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; 8],
}

impl ColumnMap {
    /// Number of required column names present in `record`.
    pub fn header_score(record: &StringRecord) -> usize {
        Column::ALL
            .iter()
            .filter(|c| record.iter().any(|cell| clean_header(cell) == c.header()))
            .count()
    }

    /// Locate every required column; fails with the list of missing ones.
    pub fn from_header(record: &StringRecord) -> Result<Self> {
        let mut positions = [0usize; 8];
        let mut missing = Vec::new();

        for column in Column::ALL {
            match record.iter().position(|cell| clean_header(cell) == column.header()) {
                Some(pos) => positions[column.slot()] = pos,
                None => missing.push(column.header().to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { positions })
        } else {
            Err(IngestError::MissingColumn(missing))
        }
    }

    /// Pull the required cells out of a data record. Short records yield
    /// empty cells.
    pub fn extract(&self, record: &StringRecord) -> RawRow {
        let mut cells: [String; 8] = Default::default();
        for column in Column::ALL {
            cells[column.slot()] = record
                .get(self.positions[column.slot()])
                .unwrap_or("")
                .trim()
                .to_string();
        }
        RawRow { cells }
    }
}

/// Raw, trimmed cell text for each required column of one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: [String; 8],
}

impl RawRow {
    /// Build from a column-name keyed mapping, as handed over by callers
    /// that decode rows themselves.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut cells: [String; 8] = Default::default();
        let mut missing = Vec::new();
        for column in Column::ALL {
            match map.get(column.header()) {
                Some(v) => cells[column.slot()] = v.trim().to_string(),
                None => missing.push(column.header().to_string()),
            }
        }
        if missing.is_empty() {
            Ok(Self { cells })
        } else {
            Err(IngestError::MissingColumn(missing))
        }
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.slot()]
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells[column.slot()] = value.into();
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

//! Typed donor records produced by the row normalizer.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::week::CalendarWeek;

/// Opaque fundraiser identifier. Never converted to a number, so leading
/// zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundraiserId(String);

impl FundraiserId {
    /// Normalize a raw id cell: trims, drops a trailing `.0` left behind by
    /// spreadsheet exports and left-pads purely numeric ids to `width`.
    pub fn normalize(raw: &str, width: usize) -> Result<Self, FieldError> {
        let mut id = raw.trim();
        if let Some(stripped) = id.strip_suffix(".0") {
            if !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit()) {
                id = stripped;
            }
        }
        if id.is_empty() {
            return Err(FieldError::Empty);
        }

        if id.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(format!("{id:0>width$}")))
        } else {
            Ok(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FundraiserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Donation payment interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "semi-annual")]
    SemiAnnual,
    #[serde(rename = "yearly")]
    Yearly,
}

impl Interval {
    /// Case-insensitive match against the interval vocabulary seen in
    /// exports (English and German).
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let norm = raw
            .trim()
            .to_lowercase()
            .replace(['_', ' '], "-");
        if norm.is_empty() {
            return Err(FieldError::Empty);
        }

        // "half-yearly" and "semi-annual" contain the yearly words, check them first
        if norm.contains("half") || norm.contains("semi") || norm.starts_with("halbj") {
            return Ok(Interval::SemiAnnual);
        }

        match norm.as_str() {
            "monthly" | "month" | "monatlich" => Ok(Interval::Monthly),
            "yearly" | "year" | "annual" | "annually" | "jährlich" | "jaehrlich" => {
                Ok(Interval::Yearly)
            }
            _ => Err(FieldError::UnknownInterval(raw.trim().to_string())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Interval::Monthly => "Monthly",
            Interval::SemiAnnual => "Half-Yearly",
            Interval::Yearly => "Yearly",
        })
    }
}

/// Agency status, collapsed to what the realization ratio needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonorStatus {
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(rename = "other")]
    Other,
}

impl DonorStatus {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let norm = raw.trim().to_lowercase();
        if norm.is_empty() {
            return Err(FieldError::Empty);
        }
        if norm.contains("approved") || norm.contains("genehmigt") {
            Ok(DonorStatus::Approved)
        } else if norm.contains("cancel") || norm.contains("storn") {
            Ok(DonorStatus::Cancelled)
        } else {
            Ok(DonorStatus::Other)
        }
    }

    /// Only approved donors count as realized.
    pub fn is_realized(&self) -> bool {
        matches!(self, DonorStatus::Approved)
    }
}

/// One accepted input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRecord {
    /// Zero-based position among the data rows of the input file
    pub row_index: usize,
    pub fundraiser_id: FundraiserId,
    pub fundraiser_name: String,
    pub calendar_week: CalendarWeek,
    /// Week cell as it appeared in the source
    pub week_label: String,
    pub donor_ref: String,
    pub age: u32,
    pub interval: Interval,
    /// Interval cell as it appeared in the source
    pub interval_label: String,
    /// Yearly amount in euros
    pub amount_yearly: Decimal,
    pub status: DonorStatus,
    /// Status cell as it appeared in the source
    pub status_label: String,
}

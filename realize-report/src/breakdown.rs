//! Per-fundraiser breakdown handed to document renderers.
//!
//! Renderers own layout; this module only decides which weeks belong to a
//! fundraiser, in what order, and the reporting period label.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use realize_core::{FundraiserId, FundraiserWeekGroup};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// German month name for the month a calendar week falls in (approximate,
/// by week-number ranges).
pub fn month_label(week: u32) -> &'static str {
    match week {
        0..=4 => "Januar",
        5..=8 => "Februar",
        9..=13 => "März",
        14..=17 => "April",
        18..=22 => "Mai",
        23..=26 => "Juni",
        27..=30 => "Juli",
        31..=34 => "August",
        35..=39 => "September",
        40..=43 => "Oktober",
        44..=47 => "November",
        _ => "Dezember",
    }
}

/// Reporting period of a breakdown, taken from its earliest week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub month: &'static str,
    pub year: i32,
}

/// All weeks of one fundraiser
#[derive(Debug, Clone, Serialize)]
pub struct FundraiserBreakdown<'a> {
    pub fundraiser_id: &'a FundraiserId,
    pub fundraiser_name: &'a str,
    pub period: Period,
    pub total_points: Decimal,
    pub eligible_weeks: usize,
    /// Weeks in ascending order
    pub weeks: Vec<&'a FundraiserWeekGroup>,
}

impl FundraiserBreakdown<'_> {
    /// `<id>_<Name>_Realisierungsdaten`, safe as a file name on every platform.
    pub fn file_stem(&self) -> String {
        let kept: String = self
            .fundraiser_name
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
            .collect();

        let mut safe = String::new();
        let mut pending_sep = false;
        for c in kept.trim().chars() {
            if c.is_whitespace() || c == '-' {
                pending_sep = true;
            } else {
                if pending_sep && !safe.is_empty() {
                    safe.push('_');
                }
                pending_sep = false;
                safe.push(c);
            }
        }

        format!("{}_{}_Realisierungsdaten", self.fundraiser_id, safe)
    }
}

/// One breakdown per fundraiser id, named after its earliest week and
/// ordered by that name, then id.
pub fn breakdowns(groups: &[FundraiserWeekGroup]) -> Vec<FundraiserBreakdown<'_>> {
    let mut by_fundraiser: BTreeMap<&FundraiserId, Vec<&FundraiserWeekGroup>> = BTreeMap::new();
    for group in groups {
        by_fundraiser.entry(group.fundraiser_id()).or_default().push(group);
    }

    let mut list: Vec<FundraiserBreakdown<'_>> = by_fundraiser
        .into_iter()
        .filter_map(|(id, mut weeks)| {
            weeks.sort_by_key(|g| (g.calendar_week(), g.first_seen()));
            let first = *weeks.first()?;
            let week = first.calendar_week();
            Some(FundraiserBreakdown {
                fundraiser_id: id,
                fundraiser_name: first.fundraiser_name(),
                period: Period {
                    month: month_label(week.week),
                    year: week.year,
                },
                total_points: weeks.iter().map(|g| g.subtotal_points()).sum(),
                eligible_weeks: weeks.iter().filter(|g| g.bonus_eligible()).count(),
                weeks,
            })
        })
        .collect();

    list.sort_by(|a, b| {
        a.fundraiser_name
            .cmp(b.fundraiser_name)
            .then_with(|| a.fundraiser_id.cmp(b.fundraiser_id))
    });
    list
}

/// Export breakdowns as pretty JSON for an external renderer.
pub fn write_breakdown_json(path: &Path, breakdowns: &[FundraiserBreakdown<'_>]) -> Result<()> {
    let json = serde_json::to_string_pretty(breakdowns).context("serialize breakdowns")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), fundraisers = breakdowns.len(), "wrote breakdown JSON");
    Ok(())
}

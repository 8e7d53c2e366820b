//! Runs scoring and aggregation over normalized input and fixes the output
//! order of the resulting groups.

use std::cmp::Ordering;

use realize_core::{BonusRule, FundraiserWeekGroup, ScoringPolicy, aggregate, score_all};
use realize_ingest::{Normalized, RowValidationError};
use tracing::info;

use crate::breakdown::{FundraiserBreakdown, breakdowns};
use crate::summary::{WeekSummary, weekly_summary};

/// Output order: week ascending, then fundraiser name, then fundraiser id,
/// then first appearance in the input.
fn group_order(a: &FundraiserWeekGroup, b: &FundraiserWeekGroup) -> Ordering {
    a.calendar_week()
        .cmp(&b.calendar_week())
        .then_with(|| a.fundraiser_name().cmp(b.fundraiser_name()))
        .then_with(|| a.fundraiser_id().cmp(b.fundraiser_id()))
        .then_with(|| a.first_seen().cmp(&b.first_seen()))
}

pub fn sort_groups(groups: &mut [FundraiserWeekGroup]) {
    groups.sort_by(group_order);
}

/// Everything one run produces, in output order
#[derive(Debug, Clone)]
pub struct Report {
    groups: Vec<FundraiserWeekGroup>,
    rejected: Vec<RowValidationError>,
    summary_rows_skipped: usize,
    rule: BonusRule,
}

impl Report {
    pub fn build(normalized: Normalized, policy: &ScoringPolicy, rule: &BonusRule) -> Self {
        let Normalized {
            records,
            rejected,
            summary_rows_skipped,
            ..
        } = normalized;

        let scored = score_all(records, policy);
        let mut groups = aggregate(scored, rule);
        sort_groups(&mut groups);

        info!(
            groups = groups.len(),
            eligible = groups.iter().filter(|g| g.bonus_eligible()).count(),
            "aggregated fundraiser weeks"
        );

        Self {
            groups,
            rejected,
            summary_rows_skipped,
            rule: rule.clone(),
        }
    }

    pub fn groups(&self) -> &[FundraiserWeekGroup] {
        &self.groups
    }

    pub fn rejected(&self) -> &[RowValidationError] {
        &self.rejected
    }

    pub fn accepted_count(&self) -> usize {
        self.groups.iter().map(|g| g.total_donors()).sum()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn summary_rows_skipped(&self) -> usize {
        self.summary_rows_skipped
    }

    pub fn weekly_summary(&self) -> Vec<WeekSummary> {
        weekly_summary(&self.groups, &self.rule)
    }

    pub fn breakdowns(&self) -> Vec<FundraiserBreakdown<'_>> {
        breakdowns(&self.groups)
    }
}

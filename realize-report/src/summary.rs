//! Run-level reduction of fundraiser/week groups keyed by week alone.

use std::collections::BTreeMap;

use realize_core::{BonusRule, CalendarWeek, FundraiserWeekGroup};
use rust_decimal::Decimal;
use serde::Serialize;

/// Totals for one calendar week across all fundraisers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week: CalendarWeek,
    pub groups: usize,
    pub eligible_groups: usize,
    pub donors: usize,
    pub approved_donors: usize,
    /// Approved share over every donor of the week
    pub realization_ratio: Decimal,
    /// Week-level ratio measured against the group threshold
    pub bonus_eligible: bool,
    /// Sum of effective (gated) points
    pub total_points: Decimal,
}

/// Summaries in ascending week order.
pub fn weekly_summary(groups: &[FundraiserWeekGroup], rule: &BonusRule) -> Vec<WeekSummary> {
    let mut weeks: BTreeMap<CalendarWeek, WeekSummary> = BTreeMap::new();

    for group in groups {
        let entry = weeks
            .entry(group.calendar_week())
            .or_insert_with(|| WeekSummary {
                week: group.calendar_week(),
                groups: 0,
                eligible_groups: 0,
                donors: 0,
                approved_donors: 0,
                realization_ratio: Decimal::ZERO,
                bonus_eligible: false,
                total_points: Decimal::ZERO,
            });
        entry.groups += 1;
        if group.bonus_eligible() {
            entry.eligible_groups += 1;
        }
        entry.donors += group.total_donors();
        entry.approved_donors += group.approved_donors();
        entry.total_points += group.subtotal_points();
    }

    weeks
        .into_values()
        .map(|mut w| {
            if w.donors > 0 {
                w.realization_ratio = Decimal::from(w.approved_donors) / Decimal::from(w.donors);
            }
            w.bonus_eligible = rule.is_eligible(w.approved_donors, w.donors);
            w
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::report::Report;
    use realize_core::{BonusRule, CalendarWeek, ScoringPolicy};
    use realize_ingest::{NormalizeOptions, normalize};
    use rust_decimal::Decimal;

    #[test]
    fn test_weekly_totals_and_eligibility() {
        let text = "\
Fundraiser ID;Fundraiser Name;Calendar week;Public RefID;Age;Interval;Amount Yearly;status_agency
1;Mara Klein;18/2025;R-1;45;Yearly;400;approved
1;Mara Klein;18/2025;R-2;45;Yearly;400;cancellation
2;Jonas Berg;18/2025;R-3;22;Monthly;50;approved
2;Jonas Berg;19/2025;R-4;33;Yearly;240;approved
";
        let normalized = normalize(text, &NormalizeOptions::default()).unwrap();
        let report = Report::build(normalized, &ScoringPolicy::default(), &BonusRule::default());
        let weeks = report.weekly_summary();

        assert_eq!(weeks.len(), 2);
        let w18 = &weeks[0];
        assert_eq!(w18.week, CalendarWeek::new(2025, 18).unwrap());
        assert_eq!(w18.groups, 2);
        assert_eq!(w18.eligible_groups, 1);
        assert_eq!(w18.donors, 3);
        assert_eq!(w18.approved_donors, 2);
        assert!(!w18.bonus_eligible);
        assert_eq!(w18.total_points, "10.5".parse::<Decimal>().unwrap());

        let w19 = &weeks[1];
        assert!(w19.bonus_eligible);
        assert_eq!(w19.total_points, Decimal::from(4));
    }
}

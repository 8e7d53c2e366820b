//! Point calculator: maps one donor record to a provisional point value.
//!
//! The policy is a short, ordered list of guarded rules. The first rule
//! whose guard matches decides the base points:
//!
//! 1. `age < 25`: 0.5
//! 2. `25 <= age < 30`: 0.5 for monthly donors, 1 otherwise
//! 3. `age >= 30`: contribution table by yearly amount and interval
//!
//! Donors older than `age_bonus_over` earn an age bonus on top of a
//! table-derived score only. The bonus is kept separate from the base so
//! the aggregator can withhold it for groups below the realization
//! threshold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::{DonorRecord, Interval};

/// One row of the contribution table. `min_amount` is an inclusive lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionTier {
    pub min_amount: Decimal,
    pub yearly: Decimal,
    pub semi_annual: Decimal,
    pub monthly: Decimal,
}

impl ContributionTier {
    fn points_for(&self, interval: Interval) -> Decimal {
        match interval {
            Interval::Yearly => self.yearly,
            Interval::SemiAnnual => self.semi_annual,
            Interval::Monthly => self.monthly,
        }
    }
}

/// Tiers in descending `min_amount` order; lookup takes the first match.
pub const CONTRIBUTION_TABLE: [ContributionTier; 4] = [
    ContributionTier {
        min_amount: Decimal::from_parts(360, 0, 0, false, 0),
        yearly: Decimal::from_parts(5, 0, 0, false, 0),
        semi_annual: Decimal::from_parts(4, 0, 0, false, 0),
        monthly: Decimal::from_parts(3, 0, 0, false, 0),
    },
    ContributionTier {
        min_amount: Decimal::from_parts(240, 0, 0, false, 0),
        yearly: Decimal::from_parts(4, 0, 0, false, 0),
        semi_annual: Decimal::from_parts(3, 0, 0, false, 0),
        monthly: Decimal::from_parts(2, 0, 0, false, 0),
    },
    ContributionTier {
        min_amount: Decimal::from_parts(180, 0, 0, false, 0),
        yearly: Decimal::from_parts(3, 0, 0, false, 0),
        semi_annual: Decimal::from_parts(25, 0, 0, false, 1),
        monthly: Decimal::from_parts(15, 0, 0, false, 1),
    },
    ContributionTier {
        min_amount: Decimal::from_parts(120, 0, 0, false, 0),
        yearly: Decimal::from_parts(2, 0, 0, false, 0),
        semi_annual: Decimal::from_parts(15, 0, 0, false, 1),
        monthly: Decimal::from_parts(1, 0, 0, false, 0),
    },
];

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Tunable parts of the scoring policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Base points for 30+ donors whose amount is below the lowest tier
    pub below_table_points: Decimal,
    /// Donors strictly older than this earn the age bonus
    pub age_bonus_over: u32,
    pub age_bonus_points: Decimal,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            below_table_points: Decimal::ZERO,
            age_bonus_over: 40,
            age_bonus_points: Decimal::ONE,
        }
    }
}

/// The guarded rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    UnderTwentyFive,
    UnderThirty,
    ContributionTable,
}

impl Rule {
    pub const ORDER: [Rule; 3] = [Rule::UnderTwentyFive, Rule::UnderThirty, Rule::ContributionTable];

    pub fn applies(&self, record: &DonorRecord) -> bool {
        match self {
            Rule::UnderTwentyFive => record.age < 25,
            Rule::UnderThirty => (25..30).contains(&record.age),
            Rule::ContributionTable => record.age >= 30,
        }
    }

    pub fn base_points(&self, record: &DonorRecord, policy: &ScoringPolicy) -> Decimal {
        match self {
            Rule::UnderTwentyFive => HALF,
            Rule::UnderThirty => {
                if record.interval == Interval::Monthly {
                    HALF
                } else {
                    Decimal::ONE
                }
            }
            Rule::ContributionTable => CONTRIBUTION_TABLE
                .iter()
                .find(|tier| record.amount_yearly >= tier.min_amount)
                .map(|tier| tier.points_for(record.interval))
                .unwrap_or(policy.below_table_points),
        }
    }

    /// First rule whose guard matches. The guards cover every age.
    pub fn select(record: &DonorRecord) -> Rule {
        Rule::ORDER
            .into_iter()
            .find(|rule| rule.applies(record))
            .unwrap_or(Rule::ContributionTable)
    }
}

/// Provisional points for one donor, before group gating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Points {
    pub rule: Rule,
    pub base: Decimal,
    /// Age bonus already contained in `total()`; zero when not earned
    pub age_bonus: Decimal,
}

impl Points {
    pub fn total(&self) -> Decimal {
        self.base + self.age_bonus
    }
}

impl ScoringPolicy {
    pub fn score(&self, record: &DonorRecord) -> Points {
        let rule = Rule::select(record);
        let base = rule.base_points(record, self);
        let age_bonus = if rule == Rule::ContributionTable && record.age > self.age_bonus_over {
            self.age_bonus_points
        } else {
            Decimal::ZERO
        };
        Points { rule, base, age_bonus }
    }
}

/// A donor record with its points assigned once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: DonorRecord,
    pub points: Points,
}

/// Score every record, keeping input order.
pub fn score_all(records: Vec<DonorRecord>, policy: &ScoringPolicy) -> Vec<ScoredRecord> {
    records
        .into_iter()
        .map(|record| {
            let points = policy.score(&record);
            ScoredRecord { record, points }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DonorStatus, FundraiserId};
    use crate::week::CalendarWeek;

    fn donor(age: u32, interval: Interval, amount: i64) -> DonorRecord {
        DonorRecord {
            row_index: 0,
            fundraiser_id: FundraiserId::normalize("7", 5).unwrap(),
            fundraiser_name: "Mara Klein".to_string(),
            calendar_week: CalendarWeek::new(2025, 18).unwrap(),
            week_label: "18/2025".to_string(),
            donor_ref: "R-1".to_string(),
            age,
            interval,
            interval_label: interval.to_string(),
            amount_yearly: Decimal::from(amount),
            status: DonorStatus::Approved,
            status_label: "approved".to_string(),
        }
    }

    fn pts(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_under_25_is_flat_half_point() {
        let policy = ScoringPolicy::default();
        for age in [0, 18, 24] {
            for interval in [Interval::Monthly, Interval::SemiAnnual, Interval::Yearly] {
                for amount in [0, 119, 400, 5000] {
                    let p = policy.score(&donor(age, interval, amount));
                    assert_eq!(p.total(), HALF);
                    assert_eq!(p.rule, Rule::UnderTwentyFive);
                }
            }
        }
    }

    #[test]
    fn test_25_to_29_depends_on_interval_only() {
        let policy = ScoringPolicy::default();
        for age in [25, 29] {
            assert_eq!(policy.score(&donor(age, Interval::Monthly, 400)).total(), HALF);
            assert_eq!(policy.score(&donor(age, Interval::SemiAnnual, 50)).total(), Decimal::ONE);
            assert_eq!(policy.score(&donor(age, Interval::Yearly, 400)).total(), Decimal::ONE);
        }
    }

    #[test]
    fn test_table_lookup_uses_inclusive_lower_bounds() {
        let policy = ScoringPolicy::default();
        let cases = [
            (360, Interval::Yearly, "5"),
            (360, Interval::SemiAnnual, "4"),
            (360, Interval::Monthly, "3"),
            (359, Interval::Yearly, "4"),
            (240, Interval::Monthly, "2"),
            (180, Interval::SemiAnnual, "2.5"),
            (180, Interval::Monthly, "1.5"),
            (120, Interval::Yearly, "2"),
            (120, Interval::SemiAnnual, "1.5"),
            (120, Interval::Monthly, "1"),
            (119, Interval::Yearly, "0"),
        ];
        for (amount, interval, expected) in cases {
            let p = policy.score(&donor(35, interval, amount));
            assert_eq!(p.total(), pts(expected), "amount {amount} {interval}");
        }
    }

    #[test]
    fn test_table_is_monotonic_in_amount() {
        let policy = ScoringPolicy::default();
        for interval in [Interval::Monthly, Interval::SemiAnnual, Interval::Yearly] {
            let mut last = Decimal::MIN;
            for amount in [0, 119, 120, 179, 180, 239, 240, 359, 360, 1000] {
                let p = policy.score(&donor(33, interval, amount)).total();
                assert!(p >= last, "{interval} dropped at {amount}");
                last = p;
            }
        }
    }

    #[test]
    fn test_age_bonus_only_above_40_and_only_on_table() {
        let policy = ScoringPolicy::default();

        let at_40 = policy.score(&donor(40, Interval::Yearly, 400));
        assert_eq!(at_40.age_bonus, Decimal::ZERO);
        assert_eq!(at_40.total(), pts("5"));

        let at_45 = policy.score(&donor(45, Interval::Yearly, 400));
        assert_eq!(at_45.base, pts("5"));
        assert_eq!(at_45.age_bonus, Decimal::ONE);
        assert_eq!(at_45.total(), pts("6"));

        let low_amount = policy.score(&donor(50, Interval::Monthly, 50));
        assert_eq!(low_amount.total(), Decimal::ONE);
    }

    #[test]
    fn test_below_table_points_is_configurable() {
        let policy = ScoringPolicy {
            below_table_points: Decimal::ONE,
            ..ScoringPolicy::default()
        };
        assert_eq!(policy.score(&donor(31, Interval::Monthly, 60)).total(), Decimal::ONE);
    }

    #[test]
    fn test_score_all_preserves_order() {
        let policy = ScoringPolicy::default();
        let mut young = donor(20, Interval::Monthly, 10);
        young.row_index = 0;
        let mut old = donor(45, Interval::Yearly, 400);
        old.row_index = 1;

        let scored = score_all(vec![young, old], &policy);
        assert_eq!(scored[0].record.row_index, 0);
        assert_eq!(scored[0].points.total(), HALF);
        assert_eq!(scored[1].points.total(), pts("6"));
    }
}

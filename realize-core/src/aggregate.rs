//! Aggregator: groups scored records by (fundraiser, calendar week) and
//! applies the realization-rate rule.
//!
//! The age bonus is the only part of a donor's score that depends on group
//! context. A group whose share of approved donors is below the threshold
//! loses the bonus on every member that earned it; table and bracket
//! points are never gated.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::points::ScoredRecord;
use crate::record::FundraiserId;
use crate::week::CalendarWeek;

/// Realization-rate threshold for the age bonus (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusRule {
    pub threshold: Decimal,
}

impl Default for BonusRule {
    fn default() -> Self {
        Self {
            threshold: Decimal::from_parts(70, 0, 0, false, 2),
        }
    }
}

impl BonusRule {
    /// Exact `approved / total >= threshold`, compared without dividing.
    pub fn is_eligible(&self, approved: usize, total: usize) -> bool {
        total > 0
            && self
                .threshold
                .checked_mul(Decimal::from(total))
                .is_some_and(|needed| Decimal::from(approved) >= needed)
    }
}

/// A scored donor inside a sealed group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub scored: ScoredRecord,
    /// Points after group gating
    pub effective_points: Decimal,
    pub bonus_withheld: bool,
}

/// All donors of one fundraiser in one calendar week.
///
/// Fields are only reachable through accessors: counts, ratio and subtotal
/// are derived from `members` when the group is sealed and cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundraiserWeekGroup {
    fundraiser_id: FundraiserId,
    fundraiser_name: String,
    calendar_week: CalendarWeek,
    first_seen: usize,
    members: Vec<GroupMember>,
    total_donors: usize,
    approved_donors: usize,
    realization_ratio: Decimal,
    bonus_eligible: bool,
    subtotal_points: Decimal,
}

impl FundraiserWeekGroup {
    /// Build a group from its records (in input order) and compute every
    /// derived field. `records` must be non-empty.
    fn seal(first_seen: usize, records: Vec<ScoredRecord>, rule: &BonusRule) -> Option<Self> {
        let first = records.first()?;
        let fundraiser_id = first.record.fundraiser_id.clone();
        let fundraiser_name = first.record.fundraiser_name.clone();
        let calendar_week = first.record.calendar_week;

        let total_donors = records.len();
        let approved_donors = records
            .iter()
            .filter(|s| s.record.status.is_realized())
            .count();
        let realization_ratio = Decimal::from(approved_donors) / Decimal::from(total_donors);
        let bonus_eligible = rule.is_eligible(approved_donors, total_donors);

        let members: Vec<GroupMember> = records
            .into_iter()
            .map(|scored| {
                let bonus_withheld = !bonus_eligible && scored.points.age_bonus > Decimal::ZERO;
                let effective_points = if bonus_withheld {
                    scored.points.total() - scored.points.age_bonus
                } else {
                    scored.points.total()
                };
                GroupMember {
                    scored,
                    effective_points,
                    bonus_withheld,
                }
            })
            .collect();
        let subtotal_points = members.iter().map(|m| m.effective_points).sum();

        Some(Self {
            fundraiser_id,
            fundraiser_name,
            calendar_week,
            first_seen,
            members,
            total_donors,
            approved_donors,
            realization_ratio,
            bonus_eligible,
            subtotal_points,
        })
    }

    pub fn fundraiser_id(&self) -> &FundraiserId {
        &self.fundraiser_id
    }

    pub fn fundraiser_name(&self) -> &str {
        &self.fundraiser_name
    }

    pub fn calendar_week(&self) -> CalendarWeek {
        self.calendar_week
    }

    /// Position of this group's key in first-seen input order
    pub fn first_seen(&self) -> usize {
        self.first_seen
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn total_donors(&self) -> usize {
        self.total_donors
    }

    pub fn approved_donors(&self) -> usize {
        self.approved_donors
    }

    pub fn realization_ratio(&self) -> Decimal {
        self.realization_ratio
    }

    pub fn bonus_eligible(&self) -> bool {
        self.bonus_eligible
    }

    pub fn subtotal_points(&self) -> Decimal {
        self.subtotal_points
    }
}

/// Group records by `(fundraiser_id, calendar_week)`.
///
/// Groups come back in first-seen order of their key; members keep input
/// order. Records must arrive in input order.
pub fn aggregate(records: Vec<ScoredRecord>, rule: &BonusRule) -> Vec<FundraiserWeekGroup> {
    let mut index: HashMap<(FundraiserId, CalendarWeek), usize> = HashMap::new();
    let mut buckets: Vec<Vec<ScoredRecord>> = Vec::new();

    for scored in records {
        let key = (
            scored.record.fundraiser_id.clone(),
            scored.record.calendar_week,
        );
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(scored);
    }

    buckets
        .into_iter()
        .enumerate()
        .filter_map(|(first_seen, records)| FundraiserWeekGroup::seal(first_seen, records, rule))
        .collect()
}

//! realize-core: donor records, the point policy and the fundraiser/week aggregator

pub mod aggregate;
pub mod error;
pub mod format;
pub mod points;
pub mod record;
pub mod week;

pub use aggregate::{BonusRule, FundraiserWeekGroup, GroupMember, aggregate};
pub use error::FieldError;
pub use format::{european_decimal, percentage};
pub use points::{ContributionTier, Points, Rule, ScoredRecord, ScoringPolicy, score_all};
pub use record::{DonorRecord, DonorStatus, FundraiserId, Interval};
pub use week::{CalendarWeek, WeekLabel};

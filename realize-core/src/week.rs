//! Calendar-week keys.
//!
//! Source exports label weeks either as `18/2025` or as `KW 18` (German
//! "Kalenderwoche", with or without a separator). Both normalize to a
//! `(year, week)` pair that orders correctly across year boundaries.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

static SLASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<week>\d{1,2})\s*/\s*(?P<year>\d{4})$").expect("static regex")
});

static KW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:kw|cw)[\s\-_.:]*(?P<week>\d{1,2})(?:\s*[/\s]\s*(?P<year>\d{4}))?$")
        .expect("static regex")
});

/// A parsed week label whose year may still be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekLabel {
    Dated(CalendarWeek),
    /// `KW WW` without a year
    Undated(u32),
}

impl WeekLabel {
    pub fn parse(label: &str) -> Result<Self, FieldError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(FieldError::Empty);
        }

        let caps = SLASH_RE
            .captures(label)
            .or_else(|| KW_RE.captures(label))
            .ok_or_else(|| FieldError::WeekPattern(label.to_string()))?;

        let week: u32 = caps["week"]
            .parse()
            .map_err(|_| FieldError::WeekPattern(label.to_string()))?;
        match caps.name("year") {
            Some(y) => {
                let year = y
                    .as_str()
                    .parse()
                    .map_err(|_| FieldError::WeekPattern(label.to_string()))?;
                CalendarWeek::new(year, week).map(WeekLabel::Dated)
            }
            None if (1..=53).contains(&week) => Ok(WeekLabel::Undated(week)),
            None => Err(FieldError::WeekOutOfRange(week)),
        }
    }

    pub fn dated(&self) -> Option<CalendarWeek> {
        match self {
            WeekLabel::Dated(w) => Some(*w),
            WeekLabel::Undated(_) => None,
        }
    }

    /// Settle the year of an undated label: closest to `anchor` when there
    /// is one, else `fallback_year`.
    pub fn resolve(
        self,
        anchor: Option<CalendarWeek>,
        fallback_year: Option<i32>,
    ) -> Result<CalendarWeek, FieldError> {
        match (self, anchor, fallback_year) {
            (WeekLabel::Dated(w), _, _) => Ok(w),
            (WeekLabel::Undated(week), Some(anchor), _) => CalendarWeek::nearest_to(week, anchor),
            (WeekLabel::Undated(week), None, Some(year)) => CalendarWeek::new(year, week),
            (WeekLabel::Undated(week), None, None) => Err(FieldError::MissingYear(week)),
        }
    }
}

/// An ISO-style calendar week. Field order gives `Ord` by year, then week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarWeek {
    pub year: i32,
    pub week: u32,
}

impl CalendarWeek {
    pub fn new(year: i32, week: u32) -> Result<Self, FieldError> {
        if !(1..=53).contains(&week) {
            return Err(FieldError::WeekOutOfRange(week));
        }
        Ok(Self { year, week })
    }

    /// Parse a week label. `default_year` is used for `KW WW` labels that
    /// carry no year of their own.
    pub fn parse(label: &str, default_year: i32) -> Result<Self, FieldError> {
        WeekLabel::parse(label)?.resolve(None, Some(default_year))
    }

    /// The week `week` in whichever of the anchor's year or its neighbours
    /// lies closest to `anchor`, so `KW 1` after `52/2024` is `1/2025`.
    pub fn nearest_to(week: u32, anchor: CalendarWeek) -> Result<Self, FieldError> {
        let diff = i64::from(week) - i64::from(anchor.week);
        let year = if diff < -26 {
            anchor.year + 1
        } else if diff > 26 {
            anchor.year - 1
        } else {
            anchor.year
        };
        Self::new(year, week)
    }

    /// Integer sort key `year * 100 + week`.
    pub fn key(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.week)
    }
}

impl fmt::Display for CalendarWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.week, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_form() {
        let w = CalendarWeek::parse("18/2025", 2000).unwrap();
        assert_eq!(w, CalendarWeek { year: 2025, week: 18 });
        assert_eq!(w.key(), 202518);
        assert_eq!(w.to_string(), "18/2025");
    }

    #[test]
    fn test_parse_kw_forms_use_default_year() {
        for label in ["KW 18", "KW18", "kw-18", "KW_18", "CW 18", "  KW 18 "] {
            let w = CalendarWeek::parse(label, 2025).unwrap();
            assert_eq!(w, CalendarWeek { year: 2025, week: 18 }, "label {label:?}");
        }
    }

    #[test]
    fn test_parse_kw_with_explicit_year() {
        let w = CalendarWeek::parse("KW 2/2026", 2025).unwrap();
        assert_eq!(w, CalendarWeek { year: 2026, week: 2 });
    }

    #[test]
    fn test_rejects_garbage_and_out_of_range() {
        assert_eq!(CalendarWeek::parse("", 2025), Err(FieldError::Empty));
        assert!(matches!(
            CalendarWeek::parse("week eighteen", 2025),
            Err(FieldError::WeekPattern(_))
        ));
        assert_eq!(
            CalendarWeek::parse("54/2025", 2025),
            Err(FieldError::WeekOutOfRange(54))
        );
        assert_eq!(CalendarWeek::parse("KW 0", 2025), Err(FieldError::WeekOutOfRange(0)));
    }

    #[test]
    fn test_undated_label_takes_year_nearest_anchor() {
        let dec = CalendarWeek { year: 2024, week: 52 };
        let kw1 = WeekLabel::parse("KW 1").unwrap();
        assert_eq!(kw1, WeekLabel::Undated(1));
        assert_eq!(kw1.resolve(Some(dec), Some(2026)), Ok(CalendarWeek { year: 2025, week: 1 }));

        let jan = CalendarWeek { year: 2025, week: 2 };
        assert_eq!(
            WeekLabel::parse("KW 51").unwrap().resolve(Some(jan), None),
            Ok(CalendarWeek { year: 2024, week: 51 })
        );
        assert_eq!(
            WeekLabel::parse("KW 19").unwrap().resolve(Some(CalendarWeek { year: 2025, week: 18 }), None),
            Ok(CalendarWeek { year: 2025, week: 19 })
        );
    }

    #[test]
    fn test_undated_label_without_anchor_or_year_fails() {
        let kw = WeekLabel::parse("KW 18").unwrap();
        assert_eq!(kw.resolve(None, None), Err(FieldError::MissingYear(18)));
        assert_eq!(kw.resolve(None, Some(2025)), Ok(CalendarWeek { year: 2025, week: 18 }));
        assert_eq!(WeekLabel::parse("18/2025").unwrap().dated(), Some(CalendarWeek { year: 2025, week: 18 }));
    }

    #[test]
    fn test_year_boundary_ordering() {
        let late = CalendarWeek::parse("52/2024", 2025).unwrap();
        let early = CalendarWeek::parse("1/2025", 2025).unwrap();
        assert!(early > late);
        assert!(early.key() > late.key());
    }
}

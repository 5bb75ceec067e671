// Financial periods.
//
// A financial year runs from April of year `N` to March of `N + 1` and is
// labelled `"N-(N+1 mod 100)"`, e.g. `2025-26`. Months are numbered by
// calendar (1 = January), so January to March of `2025-26` fall in calendar
// year 2026 and sort after April to December of the same label.

use chrono::{Datelike, Month, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// April-to-March order used by the month pickers.
pub const FIN_MONTH_ORDER: [u32; 12] = [4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinancialYear {
    start: i32,
}

impl FinancialYear {
    pub fn new(start: i32) -> Self {
        FinancialYear { start }
    }

    pub fn start(self) -> i32 {
        self.start
    }

    /// The financial year containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            FinancialYear::new(date.year())
        } else {
            FinancialYear::new(date.year() - 1)
        }
    }

    pub fn previous(self) -> Self {
        FinancialYear::new(self.start - 1)
    }

    /// Calendar year a month of this financial year falls in.
    pub fn calendar_year(self, month: u32) -> i32 {
        if (4..=12).contains(&month) {
            self.start
        } else {
            self.start + 1
        }
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start, (self.start + 1).rem_euclid(100))
    }
}

impl Serialize for FinancialYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for FinancialYear {
    type Err = String;

    /// Accepts `YYYY-YY` where the suffix is the year after `YYYY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, tail) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-YY, got {:?}", s))?;
        if head.len() != 4 || tail.len() != 2 {
            return Err(format!("expected YYYY-YY, got {:?}", s));
        }
        let start: i32 = head
            .parse()
            .map_err(|_| format!("invalid start year in {:?}", s))?;
        let end: i32 = tail
            .parse()
            .map_err(|_| format!("invalid end year in {:?}", s))?;
        if (start + 1).rem_euclid(100) != end {
            return Err(format!("{:?} does not span consecutive years", s));
        }
        Ok(FinancialYear::new(start))
    }
}

/// One month of one financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: u32,
    pub year: FinancialYear,
}

impl Period {
    pub fn new(month: u32, year: FinancialYear) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Period { month, year })
        } else {
            None
        }
    }

    pub fn calendar_year(self) -> i32 {
        self.year.calendar_year(self.month)
    }

    /// Synthetic ordering key; strictly increasing with time.
    pub fn index(self) -> i64 {
        period_index(self.calendar_year(), self.month)
    }

    pub fn label(self) -> String {
        period_label(self.month, self.year)
    }
}

pub fn period_index(calendar_year: i32, month: u32) -> i64 {
    calendar_year as i64 * 12 + (month as i64 - 1)
}

pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

pub fn period_label(month: u32, year: FinancialYear) -> String {
    format!("{}, {}", month_name(month), year)
}

/// Parse a combined `"<month>, <financial year>"` cell such as `"04, 2025-26"`.
/// A single space in place of the comma is also accepted. Anything else is
/// unclassified.
pub fn parse_period(raw: &str) -> Option<Period> {
    let raw = raw.trim();
    let (month, year) = match raw.split_once(',') {
        Some((m, y)) => (m.trim(), y.trim()),
        None => {
            let mut parts = raw.split_whitespace();
            let m = parts.next()?;
            let y = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            (m, y)
        }
    };
    if month.is_empty() || month.len() > 2 || !month.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: FinancialYear = year.parse().ok()?;
    Period::new(month, year)
}

/// Position of a month in the April-to-March picker order (0 = April).
pub fn fin_month_position(month: u32) -> Option<usize> {
    FIN_MONTH_ORDER.iter().position(|m| *m == month)
}

/// A from/to month selection relative to whichever financial year it is
/// applied to, walked in April-to-March order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinancialMonthRange {
    from: u32,
    to: u32,
}

impl FinancialMonthRange {
    /// `None` if either month is outside 1..=12. Bounds given in reverse
    /// picker order are swapped.
    pub fn new(from: u32, to: u32) -> Option<Self> {
        let from_pos = fin_month_position(from)?;
        let to_pos = fin_month_position(to)?;
        if from_pos <= to_pos {
            Some(FinancialMonthRange { from, to })
        } else {
            Some(FinancialMonthRange { from: to, to: from })
        }
    }

    /// April to March.
    pub fn full_year() -> Self {
        FinancialMonthRange { from: 4, to: 3 }
    }

    /// Months covered, in picker order.
    pub fn months(&self) -> Vec<u32> {
        let lo = fin_month_position(self.from).unwrap_or(0);
        let hi = fin_month_position(self.to).unwrap_or(11);
        FIN_MONTH_ORDER[lo..=hi].to_vec()
    }

    pub fn in_year(&self, year: FinancialYear) -> PeriodRange {
        PeriodRange {
            start: Period { month: self.from, year },
            end: Period { month: self.to, year },
        }
    }
}

/// Inclusive range of periods, compared by [`Period::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodRange {
    start: Period,
    end: Period,
}

impl PeriodRange {
    pub fn contains_index(&self, index: i64) -> bool {
        (self.start.index()..=self.end.index()).contains(&index)
    }

    pub fn label(&self) -> String {
        format!("{} to {}", self.start.label(), self.end.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fy(start: i32) -> FinancialYear {
        FinancialYear::new(start)
    }

    #[test]
    fn test_financial_year_display_and_parse() {
        assert_eq!(fy(2025).to_string(), "2025-26");
        assert_eq!(fy(1999).to_string(), "1999-00");
        assert_eq!("2025-26".parse::<FinancialYear>(), Ok(fy(2025)));
        assert_eq!("1999-00".parse::<FinancialYear>(), Ok(fy(1999)));
        assert!("2025-27".parse::<FinancialYear>().is_err());
        assert!("2025".parse::<FinancialYear>().is_err());
        assert!("25-26".parse::<FinancialYear>().is_err());
    }

    #[test]
    fn test_financial_year_containing() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(FinancialYear::containing(d(2025, 4, 1)), fy(2025));
        assert_eq!(FinancialYear::containing(d(2026, 3, 31)), fy(2025));
        assert_eq!(FinancialYear::containing(d(2026, 10, 16)), fy(2026));
    }

    #[test]
    fn test_calendar_year_wraparound() {
        assert_eq!(fy(2025).calendar_year(4), 2025);
        assert_eq!(fy(2025).calendar_year(12), 2025);
        assert_eq!(fy(2025).calendar_year(1), 2026);
        assert_eq!(fy(2025).calendar_year(3), 2026);
    }

    #[test]
    fn test_february_sorts_after_december_of_same_label() {
        let feb = Period::new(2, fy(2025)).unwrap();
        let dec = Period::new(12, fy(2025)).unwrap();
        assert!(feb.index() > dec.index());
        assert_eq!(dec.index() + 2, feb.index());
        let next_april = Period::new(4, fy(2026)).unwrap();
        assert!(next_april.index() > Period::new(3, fy(2025)).unwrap().index());
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("04, 2025-26"), Period::new(4, fy(2025)));
        assert_eq!(parse_period("4,2025-26"), Period::new(4, fy(2025)));
        assert_eq!(parse_period("02 2025-26"), Period::new(2, fy(2025)));
        assert_eq!(parse_period("13, 2025-26"), None);
        assert_eq!(parse_period("00, 2025-26"), None);
        assert_eq!(parse_period("April, 2025-26"), None);
        assert_eq!(parse_period("04, 2025"), None);
        assert_eq!(parse_period("04 2025-26 x"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn test_period_label() {
        assert_eq!(period_label(4, fy(2025)), "April, 2025-26");
        assert_eq!(Period::new(2, fy(2025)).unwrap().label(), "February, 2025-26");
    }

    #[test]
    fn test_month_range_walks_financial_order() {
        let r = FinancialMonthRange::new(4, 2).unwrap();
        assert_eq!(r.months().len(), 11);
        let r = FinancialMonthRange::new(10, 3).unwrap();
        assert_eq!(r.months(), vec![10, 11, 12, 1, 2, 3]);
        let swapped = FinancialMonthRange::new(3, 10).unwrap();
        assert_eq!(swapped, r);
        assert!(FinancialMonthRange::new(0, 3).is_none());
    }

    #[test]
    fn test_month_range_in_year_bounds() {
        let range = FinancialMonthRange::new(10, 3).unwrap().in_year(fy(2025));
        let inside = Period::new(1, fy(2025)).unwrap();
        let before = Period::new(9, fy(2025)).unwrap();
        let after = Period::new(4, fy(2026)).unwrap();
        assert!(range.contains_index(inside.index()));
        assert!(!range.contains_index(before.index()));
        assert!(!range.contains_index(after.index()));
        assert_eq!(range.label(), "October, 2025-26 to March, 2025-26");
    }
}

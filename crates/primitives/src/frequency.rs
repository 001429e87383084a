//! Sampling frequencies and period arithmetic.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days};
use serde::{Deserialize, Serialize};

use crate::{Date, ParseKeyError};

/// Calendar days in a week.
pub const DAYS_IN_1W: u32 = 7;
/// Calendar days in a month (approximate).
pub const DAYS_IN_1M: u32 = 30;
/// Calendar days in a quarter (approximate).
pub const DAYS_IN_1Q: u32 = 90;
/// Calendar days in a year.
pub const DAYS_IN_1Y: u32 = 365;

/// Business days in a week.
pub const BDAYS_IN_1W: u32 = 5;
/// Business days in a month.
pub const BDAYS_IN_1M: u32 = 21;
/// Business days in a quarter.
pub const BDAYS_IN_1Q: u32 = 63;
/// Business days in a year; the default annualization factor.
pub const BDAYS_IN_1Y: u32 = 252;

/// Weeks in a month.
pub const WEEKS_IN_1M: u32 = 4;
/// Weeks in a quarter.
pub const WEEKS_IN_1Q: u32 = 12;
/// Weeks in a year.
pub const WEEKS_IN_1Y: u32 = 52;

/// Months in a quarter.
pub const MONTHS_IN_1Q: u32 = 3;
/// Months in a year.
pub const MONTHS_IN_1Y: u32 = 12;

/// Sampling frequency of a series or of a resampling target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// Every calendar day.
    Daily,
    /// Monday to Friday.
    Business,
    /// Weeks starting on Monday.
    Weekly,
    /// Calendar months.
    Monthly,
    /// Calendar quarters.
    Quarterly,
    /// Calendar years.
    Yearly,
}

impl Frequency {
    /// First date of the period containing `date`.
    ///
    /// This is the grouping key used when resampling; two dates fall in the
    /// same period exactly when their period starts are equal.
    #[must_use]
    pub fn period_start(&self, date: Date) -> Date {
        match self {
            Self::Daily | Self::Business => date,
            Self::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Self::Monthly => date.with_day(1).unwrap_or(date),
            Self::Quarterly => {
                let month = (date.month0() / MONTHS_IN_1Q) * MONTHS_IN_1Q + 1;
                Date::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            Self::Yearly => Date::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Single-letter code.
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::Daily => 'D',
            Self::Business => 'B',
            Self::Weekly => 'W',
            Self::Monthly => 'M',
            Self::Quarterly => 'Q',
            Self::Yearly => 'Y',
        }
    }

    /// Parse a single-letter code.
    #[must_use]
    pub const fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'D' => Some(Self::Daily),
            'B' => Some(Self::Business),
            'W' => Some(Self::Weekly),
            'M' => Some(Self::Monthly),
            'Q' => Some(Self::Quarterly),
            'Y' | 'A' => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Frequency {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c),
            _ => None,
        }
        .ok_or_else(|| ParseKeyError { input: s.to_string(), reason: "unknown frequency" })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(Frequency::Daily, d(2024, 5, 17), d(2024, 5, 17))]
    #[case(Frequency::Weekly, d(2024, 5, 17), d(2024, 5, 13))]
    #[case(Frequency::Weekly, d(2024, 5, 13), d(2024, 5, 13))]
    #[case(Frequency::Monthly, d(2024, 5, 17), d(2024, 5, 1))]
    #[case(Frequency::Quarterly, d(2024, 5, 17), d(2024, 4, 1))]
    #[case(Frequency::Quarterly, d(2024, 12, 31), d(2024, 10, 1))]
    #[case(Frequency::Yearly, d(2024, 5, 17), d(2024, 1, 1))]
    fn period_start_cases(#[case] freq: Frequency, #[case] date: Date, #[case] expected: Date) {
        assert_eq!(freq.period_start(date), expected);
    }

    #[test]
    fn parse_codes() {
        assert_eq!("Y".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert_eq!("m".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("MS".parse::<Frequency>().is_err());
    }
}

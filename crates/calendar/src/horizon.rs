//! Lookback horizons such as `"3M"` or `"1Y"`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tessera_primitives::{
    BDAYS_IN_1M, BDAYS_IN_1Q, BDAYS_IN_1W, BDAYS_IN_1Y, DAYS_IN_1M, DAYS_IN_1Q, DAYS_IN_1W,
    DAYS_IN_1Y, Frequency, MONTHS_IN_1Q, MONTHS_IN_1Y, WEEKS_IN_1M, WEEKS_IN_1Q, WEEKS_IN_1Y,
};

use crate::CalendarError;

/// A number of periods at a given frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Horizon {
    periods: u32,
    frequency: Frequency,
}

impl Horizon {
    /// Create a horizon of `periods` at `frequency`.
    #[must_use]
    pub const fn new(periods: u32, frequency: Frequency) -> Self {
        Self { periods, frequency }
    }

    /// Number of periods.
    #[must_use]
    pub const fn periods(&self) -> u32 {
        self.periods
    }

    /// Period frequency.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Approximate calendar days.
    ///
    /// Saturates at `u32::MAX`; parsed horizons never get there.
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.periods.saturating_mul(day_factor(self.frequency))
    }

    /// Business days, saturating like [`Horizon::days`].
    #[must_use]
    pub const fn bdays(&self) -> u32 {
        let factor = match self.frequency {
            Frequency::Daily | Frequency::Business => 1,
            Frequency::Weekly => BDAYS_IN_1W,
            Frequency::Monthly => BDAYS_IN_1M,
            Frequency::Quarterly => BDAYS_IN_1Q,
            Frequency::Yearly => BDAYS_IN_1Y,
        };
        self.periods.saturating_mul(factor)
    }

    /// Whole weeks, if the horizon is at least weekly.
    #[must_use]
    pub const fn weeks(&self) -> Option<u32> {
        match self.frequency {
            Frequency::Daily | Frequency::Business => None,
            Frequency::Weekly => Some(self.periods),
            Frequency::Monthly => Some(self.periods.saturating_mul(WEEKS_IN_1M)),
            Frequency::Quarterly => Some(self.periods.saturating_mul(WEEKS_IN_1Q)),
            Frequency::Yearly => Some(self.periods.saturating_mul(WEEKS_IN_1Y)),
        }
    }

    /// Whole months, if the horizon is at least monthly.
    #[must_use]
    pub const fn months(&self) -> Option<u32> {
        match self.frequency {
            Frequency::Daily | Frequency::Business | Frequency::Weekly => None,
            Frequency::Monthly => Some(self.periods),
            Frequency::Quarterly => Some(self.periods.saturating_mul(MONTHS_IN_1Q)),
            Frequency::Yearly => Some(self.periods.saturating_mul(MONTHS_IN_1Y)),
        }
    }

    /// Whole years, if the horizon is yearly.
    #[must_use]
    pub const fn years(&self) -> Option<u32> {
        match self.frequency {
            Frequency::Yearly => Some(self.periods),
            _ => None,
        }
    }
}

/// Calendar days per period; the largest of the per-period counts.
const fn day_factor(frequency: Frequency) -> u32 {
    match frequency {
        Frequency::Daily | Frequency::Business => 1,
        Frequency::Weekly => DAYS_IN_1W,
        Frequency::Monthly => DAYS_IN_1M,
        Frequency::Quarterly => DAYS_IN_1Q,
        Frequency::Yearly => DAYS_IN_1Y,
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.periods, self.frequency.code())
    }
}

impl FromStr for Horizon {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidHorizon(s.to_string());
        let s_trim = s.trim();
        let code = s_trim.chars().last().ok_or_else(invalid)?;
        let number = &s_trim[..s_trim.len() - code.len_utf8()];
        let periods = number.parse::<u32>().map_err(|_| invalid())?;
        let frequency = Frequency::from_code(code.to_ascii_uppercase()).ok_or_else(invalid)?;
        // Every count must fit in a u32.
        if periods == 0 || periods.checked_mul(day_factor(frequency)).is_none() {
            return Err(invalid());
        }
        Ok(Self { periods, frequency })
    }
}

impl TryFrom<String> for Horizon {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Horizon> for String {
    fn from(value: Horizon) -> Self {
        value.to_string()
    }
}

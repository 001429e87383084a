//! The session calendar.

use chrono::{Datelike, Months};
use serde::{Deserialize, Serialize};
use tessera_primitives::{BDAYS_IN_1Y, Date};
use tessera_traits::CalendarSource;

use crate::{CalendarError, business_days, shift_business_days};

/// Configuration for building a [`Calendar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// First date of the daily grid. Derived from `periods` when absent.
    pub start: Option<Date>,
    /// Last date of the daily grid.
    pub end: Date,
    /// Number of business days back from `end`, used when `start` is absent.
    pub periods: Option<usize>,
    /// Override for the first month of the monthly grid.
    pub monthly_start: Option<Date>,
    /// Override for the first year of the yearly grid.
    pub yearly_start: Option<Date>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: chrono::Local::now().date_naive(),
            periods: Some(5 * BDAYS_IN_1Y as usize), // ~5 years
            monthly_start: None,
            yearly_start: None,
        }
    }
}

impl CalendarConfig {
    /// Configuration spanning `[start, end]`.
    #[must_use]
    pub const fn between(start: Date, end: Date) -> Self {
        Self { start: Some(start), end, periods: None, monthly_start: None, yearly_start: None }
    }
}

/// Ordered business-day grid plus monthly and yearly grids.
///
/// Built once per session; only the elaboration date can move afterwards.
#[derive(Debug, Clone)]
pub struct Calendar {
    start: Date,
    end: Date,
    daily: Vec<Date>,
    xt0: usize,
    monthly: Vec<Date>,
    yearly: Vec<Date>,
}

impl Calendar {
    /// Build the calendar.
    ///
    /// # Errors
    /// Returns `CalendarError::MissingStart` if neither `start` nor `periods`
    /// is set, `CalendarError::Empty` if the bounds hold no business day.
    pub fn new(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let (mut start, mut end) = match (config.start, config.periods) {
            (Some(start), _) => (start, config.end),
            (None, Some(periods)) => {
                let back = i64::try_from(periods)
                    .map_err(|_| CalendarError::InvalidConfig("periods too large".to_string()))?;
                let start = shift_business_days(config.end, -back).ok_or_else(|| {
                    CalendarError::InvalidConfig("periods reach before the minimum date".to_string())
                })?;
                (start, config.end)
            }
            (None, None) => return Err(CalendarError::MissingStart),
        };
        if end < start {
            std::mem::swap(&mut start, &mut end);
        }

        let daily = business_days(start, end);
        if daily.is_empty() {
            return Err(CalendarError::Empty { start, end });
        }

        // t0 is the last grid date strictly before `end`
        let xt0 = daily.partition_point(|d| *d < end).saturating_sub(1);

        let monthly_first = previous_period(
            month_start(config.monthly_start.unwrap_or(start)),
            |d| d.month() == start.month() && d.year() == start.year(),
            Months::new(1),
        );
        let monthly = periodic_grid(monthly_first, end, Months::new(1));

        let yearly_first = previous_period(
            year_start(config.yearly_start.unwrap_or(start)),
            |d| d.year() == start.year(),
            Months::new(12),
        );
        let yearly = periodic_grid(yearly_first, end, Months::new(12));

        if monthly.len() < 2 || yearly.len() < 2 {
            return Err(CalendarError::InvalidConfig(
                "monthly and yearly grids need at least two periods before the end date"
                    .to_string(),
            ));
        }

        let calendar = Self { start, end, daily, xt0, monthly, yearly };
        tracing::info!(
            start = %calendar.start,
            end = %calendar.end,
            t0 = %calendar.t0(),
            days = calendar.daily.len(),
            t0m = %calendar.t0m(),
            t0y = %calendar.t0y(),
            "calendar initialized"
        );
        Ok(calendar)
    }

    /// Daily business-day grid.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.daily
    }

    /// Number of daily grid dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.daily.len()
    }

    /// Check if empty (never true for a built calendar).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// Configured start bound.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Configured end bound.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Elaboration date.
    #[must_use]
    pub fn t0(&self) -> Date {
        self.daily[self.xt0]
    }

    /// Index of the elaboration date in the daily grid.
    #[must_use]
    pub const fn xt0(&self) -> usize {
        self.xt0
    }

    /// Move the elaboration date.
    ///
    /// # Errors
    /// Returns `CalendarError::NotInCalendar` if `date` is not a grid date.
    pub fn set_t0(&mut self, date: Date) -> Result<(), CalendarError> {
        self.xt0 = self.index_of(date).ok_or(CalendarError::NotInCalendar(date))?;
        tracing::debug!(t0 = %date, "elaboration date moved");
        Ok(())
    }

    /// Month-start grid.
    #[must_use]
    pub fn monthly(&self) -> &[Date] {
        &self.monthly
    }

    /// Monthly elaboration date (second-to-last month start).
    #[must_use]
    pub fn t0m(&self) -> Date {
        self.monthly[self.monthly.len() - 2]
    }

    /// Year-start grid.
    #[must_use]
    pub fn yearly(&self) -> &[Date] {
        &self.yearly
    }

    /// Yearly elaboration date (second-to-last year start).
    #[must_use]
    pub fn t0y(&self) -> Date {
        self.yearly[self.yearly.len() - 2]
    }

    /// Whether `date` is a daily grid date.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.daily.binary_search(&date).is_ok()
    }

    /// Index of `date` in the daily grid.
    #[must_use]
    pub fn index_of(&self, date: Date) -> Option<usize> {
        self.daily.binary_search(&date).ok()
    }

    /// Shift `date` by `n` grid periods, starting from its nearest grid date.
    ///
    /// # Errors
    /// Returns `CalendarError::OutOfRange` if the target leaves the grid.
    pub fn shift(&self, date: Date, n: i64) -> Result<Date, CalendarError> {
        let out = || CalendarError::OutOfRange { date, periods: n };
        let base = i64::try_from(self.nearest_index(date)).map_err(|_| out())?;
        let target = base
            .checked_add(n)
            .and_then(|t| usize::try_from(t).ok())
            .ok_or_else(out)?;
        self.daily.get(target).copied().ok_or_else(out)
    }

    /// Number of grid periods between the nearest grid dates of `a` and `b`.
    #[must_use]
    pub fn run_len(&self, a: Date, b: Date) -> i64 {
        let ia = self.nearest_index(a);
        let ib = self.nearest_index(b);
        if ib >= ia { (ib - ia) as i64 } else { -((ia - ib) as i64) }
    }

    fn nearest_index(&self, date: Date) -> usize {
        let p = self.daily.partition_point(|d| *d < date);
        if p == self.daily.len() {
            return p - 1;
        }
        if p == 0 || self.daily[p] == date {
            return p;
        }
        // ties go to the earlier date
        let before = (date - self.daily[p - 1]).num_days();
        let after = (self.daily[p] - date).num_days();
        if after < before { p } else { p - 1 }
    }
}

impl CalendarSource for Calendar {
    fn grid(&self) -> &[Date] {
        &self.daily
    }

    fn calendar_range(&self) -> (Date, Date) {
        (self.daily[0], self.daily[self.daily.len() - 1])
    }

    fn t0(&self) -> Date {
        Self::t0(self)
    }
}

fn month_start(date: Date) -> Date {
    date.with_day(1).unwrap_or(date)
}

fn year_start(date: Date) -> Date {
    Date::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Step back one period when `first` falls in the same period as `start`,
/// so the grid always has a complete period before the start.
fn previous_period(
    first: Date,
    same_period: impl Fn(Date) -> bool,
    step: Months,
) -> Date {
    if same_period(first) { first.checked_sub_months(step).unwrap_or(first) } else { first }
}

fn periodic_grid(first: Date, end: Date, step: Months) -> Vec<Date> {
    let mut out = Vec::new();
    let mut current = Some(first);
    while let Some(d) = current.filter(|d| *d <= end) {
        out.push(d);
        current = d.checked_add_months(step);
    }
    out
}

//! Business-day arithmetic.

use chrono::{Datelike, Days, Weekday};
use tessera_primitives::Date;

/// Whether `date` falls Monday to Friday.
#[must_use]
pub fn is_business_day(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All business days in `[start, end]`, ascending.
#[must_use]
pub fn business_days(start: Date, end: Date) -> Vec<Date> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).filter(|d| is_business_day(*d)).collect()
}

/// Move `date` by `n` business days (negative moves backwards).
///
/// A non-business starting date counts from the adjacent business day in
/// the direction of travel. Returns `None` on calendar overflow.
#[must_use]
pub fn shift_business_days(date: Date, n: i64) -> Option<Date> {
    let step = |d: Date| {
        if n >= 0 { d.checked_add_days(Days::new(1)) } else { d.checked_sub_days(Days::new(1)) }
    };
    let mut current = date;
    let mut remaining = n.unsigned_abs();
    while remaining > 0 {
        current = step(current)?;
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    Some(current)
}

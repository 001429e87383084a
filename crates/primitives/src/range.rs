//! Date range bounds.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Inclusive date bounds used to slice a series.
///
/// Either bound may be absent, meaning unbounded in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First date included, if bounded.
    pub start: Option<Date>,
    /// Last date included, if bounded.
    pub end: Option<Date>,
}

impl DateRange {
    /// Create a range from optional bounds.
    #[must_use]
    pub const fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    /// Unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self { start: None, end: None }
    }

    /// Closed range `[start, end]`.
    #[must_use]
    pub const fn between(start: Date, end: Date) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// Range starting at `start`, unbounded above.
    #[must_use]
    pub const fn from(start: Date) -> Self {
        Self { start: Some(start), end: None }
    }

    /// Range ending at `end`, unbounded below.
    #[must_use]
    pub const fn until(end: Date) -> Self {
        Self { start: None, end: Some(end) }
    }

    /// Whether neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether the bounds describe an empty interval (`start > end`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// Narrow this range by another; the result is inside both.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self { start, end }
    }
}

//! Calendar trait definitions.

use tessera_primitives::Date;

/// Source of the alignment grid shared by every computation in a session.
pub trait CalendarSource {
    /// Ordered, deduplicated grid dates.
    fn grid(&self) -> &[Date];

    /// First and last dates of the calendar.
    fn calendar_range(&self) -> (Date, Date);

    /// Elaboration date: the most recent date for which data is expected.
    fn t0(&self) -> Date;
}

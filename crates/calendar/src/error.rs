//! Error types for calendar construction and lookups.

use tessera_primitives::Date;

/// Errors that can occur while building or querying a calendar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Neither a start date nor a number of periods was configured.
    #[error("either a start date or a number of periods is required")]
    MissingStart,

    /// The bounds contain no business day.
    #[error("no business day between {start} and {end}")]
    Empty {
        /// Start bound.
        start: Date,
        /// End bound.
        end: Date,
    },

    /// Date is not part of the grid.
    #[error("{0} is not a calendar date")]
    NotInCalendar(Date),

    /// Shift would leave the grid.
    #[error("shifting {date} by {periods} periods leaves the calendar")]
    OutOfRange {
        /// Starting date.
        date: Date,
        /// Requested shift.
        periods: i64,
    },

    /// Horizon string could not be parsed.
    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),

    /// Inconsistent configuration.
    #[error("invalid calendar configuration: {0}")]
    InvalidConfig(String),
}

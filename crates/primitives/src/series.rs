//! Time series type definitions.

use ndarray::{Array1, ArrayView1, Axis, aview0};
use serde::{Deserialize, Serialize};

use crate::Date;

/// Errors raised when a series would break its ordering invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// Dates and values have different lengths.
    #[error("length mismatch: {dates} dates, {values} values")]
    LengthMismatch {
        /// Number of dates.
        dates: usize,
        /// Number of values.
        values: usize,
    },

    /// Dates are not strictly increasing.
    #[error("dates not strictly increasing at index {index} ({date})")]
    Unsorted {
        /// Index of the first offending date.
        index: usize,
        /// The offending date.
        date: Date,
    },

    /// The same date appears twice.
    #[error("duplicate date {0}")]
    DuplicateDate(Date),

    /// Appended date does not follow the current tail.
    #[error("date {date} is not after the last date {last}")]
    NotAfterLast {
        /// Date being appended.
        date: Date,
        /// Current last date.
        last: Date,
    },

    /// Corrected date is not part of the series.
    #[error("date {0} not in series")]
    DateNotFound(Date),
}

/// An owned, date-ordered series of observations.
///
/// Dates are strictly increasing; NaN marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<Date>,
    values: Array1<f64>,
}

impl TimeSeries {
    /// Create a series, checking the ordering invariant.
    ///
    /// # Errors
    /// Returns `SeriesError::LengthMismatch` or `SeriesError::Unsorted`.
    pub fn new(dates: Vec<Date>, values: Array1<f64>) -> Result<Self, SeriesError> {
        check_parts(&dates, values.len())?;
        Ok(Self { dates, values })
    }

    /// Create a series from `(date, value)` pairs in any order.
    ///
    /// # Errors
    /// Returns `SeriesError::DuplicateDate` if a date repeats.
    pub fn from_unsorted(mut pairs: Vec<(Date, f64)>) -> Result<Self, SeriesError> {
        pairs.sort_by_key(|(d, _)| *d);
        if let Some(w) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(SeriesError::DuplicateDate(w[0].0));
        }
        let (dates, values): (Vec<Date>, Vec<f64>) = pairs.into_iter().unzip();
        Ok(Self { dates, values: Array1::from(values) })
    }

    /// Empty series.
    #[must_use]
    pub fn empty() -> Self {
        Self { dates: Vec::new(), values: Array1::zeros(0) }
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Observation values.
    #[must_use]
    pub const fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// First date, if any.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// Last date, if any.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Value at an exact date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    /// Borrow as a view.
    #[must_use]
    pub fn view(&self) -> SeriesView<'_> {
        SeriesView { dates: &self.dates, values: self.values.view() }
    }

    /// Split into dates and values.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Date>, Array1<f64>) {
        (self.dates, self.values)
    }

    /// Append a trailing observation.
    ///
    /// # Errors
    /// Returns `SeriesError::NotAfterLast` if `date` does not follow the tail.
    pub fn append(&mut self, date: Date, value: f64) -> Result<(), SeriesError> {
        if let Some(last) = self.last_date()
            && date <= last
        {
            return Err(SeriesError::NotAfterLast { date, last });
        }
        self.values.push(Axis(0), aview0(&value)).map_err(|_| SeriesError::LengthMismatch {
            dates: self.dates.len() + 1,
            values: self.values.len(),
        })?;
        self.dates.push(date);
        Ok(())
    }

    /// Correct the value of an existing observation.
    ///
    /// # Errors
    /// Returns `SeriesError::DateNotFound` if `date` is not in the series.
    pub fn correct(&mut self, date: Date, value: f64) -> Result<(), SeriesError> {
        let i = self.dates.binary_search(&date).map_err(|_| SeriesError::DateNotFound(date))?;
        self.values[i] = value;
        Ok(())
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// A borrowed, zero-copy window onto a series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    dates: &'a [Date],
    values: ArrayView1<'a, f64>,
}

impl<'a> SeriesView<'a> {
    /// Create a view over parallel date and value slices.
    ///
    /// Only lengths are checked here; dates are assumed to already satisfy
    /// the ordering invariant of their owner.
    ///
    /// # Errors
    /// Returns `SeriesError::LengthMismatch` if the lengths differ.
    pub fn new(dates: &'a [Date], values: ArrayView1<'a, f64>) -> Result<Self, SeriesError> {
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch { dates: dates.len(), values: values.len() });
        }
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]), "view dates must be sorted");
        Ok(Self { dates, values })
    }

    /// Number of observations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates.
    #[must_use]
    pub const fn dates(&self) -> &'a [Date] {
        self.dates
    }

    /// Observation values.
    #[must_use]
    pub const fn values(&self) -> ArrayView1<'a, f64> {
        self.values
    }

    /// Copy into an owned series.
    #[must_use]
    pub fn to_owned(&self) -> TimeSeries {
        TimeSeries { dates: self.dates.to_vec(), values: self.values.to_owned() }
    }
}

fn check_parts(dates: &[Date], n_values: usize) -> Result<(), SeriesError> {
    if dates.len() != n_values {
        return Err(SeriesError::LengthMismatch { dates: dates.len(), values: n_values });
    }
    if let Some(i) = dates.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SeriesError::Unsorted { index: i + 1, date: dates[i + 1] });
    }
    Ok(())
}

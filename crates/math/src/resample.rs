//! Downsampling onto coarser frequencies.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tessera_primitives::{Date, Frequency, SeriesView, TimeSeries};

use crate::{MathError, align_to_grid};

/// How the values of one period collapse into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Sum of values.
    Sum,
    /// Arithmetic mean of values.
    Mean,
    /// Last observed value.
    Last,
    /// Number of observed values.
    Count,
}

/// Treatment of dates with no observation before grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Align onto the grid and fill gaps with zero. Every grid period yields
    /// a row.
    #[default]
    ZeroFill,
    /// Group observed values only. Periods without observations are absent.
    Skip,
}

/// Resample a series to `freq`.
///
/// Output dates are period starts in ascending order. Under
/// [`MissingPolicy::ZeroFill`] the series is first aligned onto `grid`;
/// zeros enter `Sum` and `Mean`, while `Last` and `Count` only see real
/// observations (`Last` is NaN for a period with none). `grid` is ignored
/// under [`MissingPolicy::Skip`].
///
/// # Errors
/// Returns `MathError::Series` if the grid is not strictly increasing.
pub fn resample(
    view: SeriesView<'_>,
    freq: Frequency,
    agg: Aggregation,
    policy: MissingPolicy,
    grid: &[Date],
) -> Result<TimeSeries, MathError> {
    let (dates, values, zero_fill) = match policy {
        MissingPolicy::ZeroFill => (grid, align_to_grid(view, grid), true),
        MissingPolicy::Skip => (view.dates(), view.values().to_owned(), false),
    };

    let mut starts: Vec<Date> = Vec::new();
    let mut out: Vec<(f64, usize)> = Vec::new();
    let mut group = Group::default();
    for (date, &v) in dates.iter().zip(values.iter()) {
        let key = freq.period_start(*date);
        if starts.last() != Some(&key) {
            if !starts.is_empty() {
                out.push((group.finish(agg), group.observed));
            }
            starts.push(key);
            group = Group::default();
        }
        group.push(v, zero_fill);
    }
    if !starts.is_empty() {
        out.push((group.finish(agg), group.observed));
    }

    let (dates, values): (Vec<Date>, Vec<f64>) = starts
        .into_iter()
        .zip(out)
        .filter(|(_, (_, observed))| zero_fill || *observed > 0)
        .map(|(date, (value, _))| (date, value))
        .unzip();
    Ok(TimeSeries::new(dates, Array1::from(values))?)
}

#[derive(Debug, Default)]
struct Group {
    sum: f64,
    slots: usize,
    observed: usize,
    last: Option<f64>,
}

impl Group {
    fn push(&mut self, v: f64, zero_fill: bool) {
        if v.is_nan() {
            if zero_fill {
                self.slots += 1;
            }
            return;
        }
        self.sum += v;
        self.slots += 1;
        self.observed += 1;
        self.last = Some(v);
    }

    fn finish(&self, agg: Aggregation) -> f64 {
        match agg {
            Aggregation::Sum if self.slots == 0 => f64::NAN,
            Aggregation::Sum => self.sum,
            Aggregation::Mean if self.slots == 0 => f64::NAN,
            Aggregation::Mean => self.sum / self.slots as f64,
            Aggregation::Last => self.last.unwrap_or(f64::NAN),
            Aggregation::Count => self.observed as f64,
        }
    }
}

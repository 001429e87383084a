//! Missing-value filling and removal.

use ndarray::{Array1, ArrayView1};
use tessera_primitives::{Date, SeriesView, TimeSeries};

/// Replace every NaN with `fill`.
#[must_use]
pub fn fillna(values: ArrayView1<'_, f64>, fill: f64) -> Array1<f64> {
    values.mapv(|v| if v.is_nan() { fill } else { v })
}

/// Forward-fill NaN with the last observed value; leading gaps get `lead`.
#[must_use]
pub fn ffill(values: ArrayView1<'_, f64>, lead: f64) -> Array1<f64> {
    let mut carry = lead;
    values.mapv(|v| {
        if !v.is_nan() {
            carry = v;
        }
        carry
    })
}

/// Drop missing observations, keeping dates and values in step.
#[must_use]
pub fn dropna(view: SeriesView<'_>) -> TimeSeries {
    let (dates, values): (Vec<Date>, Vec<f64>) = view
        .dates()
        .iter()
        .zip(view.values().iter())
        .filter(|(_, v)| !v.is_nan())
        .map(|(d, v)| (*d, *v))
        .unzip();
    // a subsequence of a valid series is valid
    TimeSeries::new(dates, Array1::from(values)).unwrap_or_else(|_| view.to_owned())
}

//! Last- and next-valid-value lookups.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tessera_primitives::{Date, SeriesView};

use crate::MathError;

/// Strategy for locating the last non-missing entry.
///
/// All policies return the same index; they differ only in cost profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Walk backwards from the tail. O(k) for k trailing gaps.
    Reverse,
    /// Mask the whole array and take the last hit. Always O(n).
    Forward,
    /// Reverse scan for up to `max(1, log2 n)` misses, then a forward pass
    /// over the unscanned prefix.
    #[default]
    Adaptive,
}

/// The most recent (or next) observation found by a lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidPoint {
    /// Position in the input.
    pub index: usize,
    /// Observation date.
    pub date: Date,
    /// Observation value (never NaN).
    pub value: f64,
}

/// Index of the last non-NaN value.
///
/// # Errors
/// Returns `MathError::EmptySeries` for empty input and
/// `MathError::AllMissing` if every value is NaN.
pub fn last_valid_index(values: ArrayView1<'_, f64>) -> Result<usize, MathError> {
    last_valid_index_with(values, ScanPolicy::default())
}

/// Index of the last non-NaN value at or before position `i`.
///
/// # Errors
/// Returns `MathError::EmptySeries` for empty input or an out-of-range `i`,
/// and `MathError::AllMissing` if nothing valid precedes `i`.
pub fn last_valid_index_from(values: ArrayView1<'_, f64>, i: usize) -> Result<usize, MathError> {
    if i >= values.len() {
        return Err(MathError::EmptySeries);
    }
    last_valid_index(values.slice_move(ndarray::s![..=i]))
}

/// Index of the last non-NaN value using an explicit scan policy.
///
/// # Errors
/// Same as [`last_valid_index`].
pub fn last_valid_index_with(
    values: ArrayView1<'_, f64>,
    policy: ScanPolicy,
) -> Result<usize, MathError> {
    let n = values.len();
    if n == 0 {
        return Err(MathError::EmptySeries);
    }
    match policy {
        ScanPolicy::Reverse => reverse_scan(values, n),
        ScanPolicy::Forward => forward_scan(values, n),
        ScanPolicy::Adaptive => {
            let budget = (n.ilog2() as usize).max(1);
            let scanned = budget.min(n);
            if let Ok(i) = reverse_scan(values.slice(ndarray::s![n - scanned..]), scanned) {
                return Ok(n - scanned + i);
            }
            if scanned == n {
                return Err(MathError::AllMissing);
            }
            tracing::trace!(len = n, scanned, "reverse scan budget exhausted, masking prefix");
            forward_scan(values, n - scanned)
        }
    }
}

fn reverse_scan(values: ArrayView1<'_, f64>, upto: usize) -> Result<usize, MathError> {
    (0..upto).rev().find(|&i| !values[i].is_nan()).ok_or(MathError::AllMissing)
}

fn forward_scan(values: ArrayView1<'_, f64>, upto: usize) -> Result<usize, MathError> {
    let mut last = None;
    for (i, v) in values.iter().take(upto).enumerate() {
        if !v.is_nan() {
            last = Some(i);
        }
    }
    last.ok_or(MathError::AllMissing)
}

/// Most recent valid observation on or before `at` (the last date if `None`).
///
/// # Errors
/// Returns `MathError::EmptySeries` if no date is on or before `at`, and
/// `MathError::AllMissing` if every candidate is NaN.
pub fn last_valid_value(view: SeriesView<'_>, at: Option<Date>) -> Result<ValidPoint, MathError> {
    let dates = view.dates();
    let end = at.map_or(dates.len(), |at| dates.partition_point(|d| *d <= at));
    if end == 0 {
        return Err(MathError::EmptySeries);
    }
    let index = last_valid_index(view.values().slice_move(ndarray::s![..end]))?;
    Ok(ValidPoint { index, date: dates[index], value: view.values()[index] })
}

/// Index of the first non-NaN value at or after position `from`.
///
/// # Errors
/// Returns `MathError::EmptySeries` if `from` is past the end, and
/// `MathError::AllMissing` if nothing valid follows.
pub fn next_valid_index(values: ArrayView1<'_, f64>, from: usize) -> Result<usize, MathError> {
    if from >= values.len() {
        return Err(MathError::EmptySeries);
    }
    (from..values.len()).find(|&i| !values[i].is_nan()).ok_or(MathError::AllMissing)
}

/// First valid observation on or after `at` (the first date if `None`).
///
/// # Errors
/// Same as [`next_valid_index`].
pub fn next_valid_value(view: SeriesView<'_>, at: Option<Date>) -> Result<ValidPoint, MathError> {
    let dates = view.dates();
    let from = at.map_or(0, |at| dates.partition_point(|d| *d < at));
    let index = next_valid_index(view.values(), from)?;
    Ok(ValidPoint { index, date: dates[index], value: view.values()[index] })
}

//! Date-range slicing over sorted date indices.
//!
//! Every function here returns borrowed views into its input; nothing is
//! copied and nothing is mutated.

use std::ops::Range;

use ndarray::{ArrayView1, ArrayView2, Axis, s};
use tessera_primitives::{Date, DateRange, SeriesView};

use crate::MathError;

/// Positions bounding the dates that fall inside `range`.
///
/// Both bounds are inclusive: the lower position is the first date on or
/// after `range.start`, the upper position is the first date strictly after
/// `range.end`. An absent bound maps to `0` or `dates.len()`. A range with
/// `start > end` selects nothing.
///
/// # Arguments
/// * `dates` - Strictly increasing dates
/// * `range` - Date bounds
///
/// # Returns
/// Half-open index range into `dates`.
#[must_use]
pub fn search_trim_pos(dates: &[Date], range: &DateRange) -> Range<usize> {
    debug_assert!(dates.windows(2).all(|w| w[0] < w[1]), "dates must be strictly increasing");

    let lower = range.start.map_or(0, |start| dates.partition_point(|d| *d < start));
    let upper = range.end.map_or(dates.len(), |end| dates.partition_point(|d| *d <= end));
    if lower > upper { lower..lower } else { lower..upper }
}

/// Cut a `(dates, values)` pair to `range`.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if `dates` and `values` differ in
/// length.
pub fn trim_ts<'a>(
    dates: &'a [Date],
    values: ArrayView1<'a, f64>,
    range: &DateRange,
) -> Result<(&'a [Date], ArrayView1<'a, f64>), MathError> {
    if dates.len() != values.len() {
        return Err(MathError::DimensionMismatch { expected: dates.len(), actual: values.len() });
    }
    let pos = search_trim_pos(dates, range);
    let values = values.slice_move(s![pos.clone()]);
    Ok((&dates[pos], values))
}

/// Cut a series view to `range`.
#[must_use]
pub fn trim_view<'a>(view: SeriesView<'a>, range: &DateRange) -> SeriesView<'a> {
    let pos = search_trim_pos(view.dates(), range);
    let values = view.values().slice_move(s![pos.clone()]);
    // lengths agree by construction of the view
    SeriesView::new(&view.dates()[pos], values).unwrap_or(view)
}

/// Cut the rows of a `(dates x series)` matrix to `range`.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the row count differs from the
/// number of dates.
pub fn trim_rows<'a>(
    dates: &'a [Date],
    matrix: ArrayView2<'a, f64>,
    range: &DateRange,
) -> Result<(&'a [Date], ArrayView2<'a, f64>), MathError> {
    let rows = matrix.len_of(Axis(0));
    if dates.len() != rows {
        return Err(MathError::DimensionMismatch { expected: dates.len(), actual: rows });
    }
    let pos = search_trim_pos(dates, range);
    let matrix = matrix.slice_move(s![pos.clone(), ..]);
    Ok((&dates[pos], matrix))
}

/// Linear mask scan selecting the same positions as [`search_trim_pos`].
///
/// Kept as the O(n) baseline for benchmarks and cross-checks.
#[must_use]
pub fn mask_trim_pos(dates: &[Date], range: &DateRange) -> Range<usize> {
    let mut selected = dates.iter().enumerate().filter(|(_, d)| range.contains(**d)).map(|(i, _)| i);
    match selected.next() {
        Some(first) => first..selected.last().unwrap_or(first) + 1,
        None => {
            let p = search_trim_pos(dates, range).start;
            p..p
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2, array};
    use rstest::rstest;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn dates() -> Vec<Date> {
        (3..=7).map(d).collect()
    }

    #[test]
    fn worked_example() {
        let dates = dates();
        let values = array![1.0, 2.0, f64::NAN, 4.0, 5.0];
        let (ds, vs) = trim_ts(&dates, values.view(), &DateRange::between(d(4), d(6))).unwrap();
        assert_eq!(ds, &[d(4), d(5), d(6)]);
        assert_eq!(vs[0], 2.0);
        assert!(vs[1].is_nan());
        assert_eq!(vs[2], 4.0);
    }

    #[test]
    fn unbounded_range_returns_input() {
        let dates = dates();
        let values = Array1::linspace(0.0, 4.0, 5);
        let (ds, vs) = trim_ts(&dates, values.view(), &DateRange::all()).unwrap();
        assert_eq!(ds, dates.as_slice());
        assert_eq!(vs, values.view());
    }

    #[test]
    fn slice_of_slice_matches_direct_slice() {
        let dates: Vec<Date> = (1..=31).map(d).collect();
        let values = Array1::linspace(1.0, 31.0, 31);
        let outer = DateRange::between(d(5), d(25));
        let inner = DateRange::between(d(10), d(12));

        let (ds, vs) = trim_ts(&dates, values.view(), &outer).unwrap();
        let (ds2, vs2) = trim_ts(ds, vs, &inner).unwrap();
        let (ds3, vs3) = trim_ts(&dates, values.view(), &inner).unwrap();
        assert_eq!(ds2, ds3);
        assert_eq!(vs2, vs3);
    }

    #[rstest]
    #[case(DateRange::between(d(1), d(2)), 0..0)]
    #[case(DateRange::between(d(8), d(20)), 5..5)]
    #[case(DateRange::between(d(6), d(4)), 3..3)]
    #[case(DateRange::from(d(5)), 2..5)]
    #[case(DateRange::until(d(5)), 0..3)]
    #[case(DateRange::between(d(1), d(31)), 0..5)]
    fn trim_positions(#[case] range: DateRange, #[case] expected: Range<usize>) {
        let dates = dates();
        assert_eq!(search_trim_pos(&dates, &range), expected);
        if !expected.is_empty() {
            assert_eq!(mask_trim_pos(&dates, &range), expected);
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(search_trim_pos(&[], &DateRange::all()), 0..0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let dates = dates();
        let values = array![1.0, 2.0];
        let err = trim_ts(&dates, values.view(), &DateRange::all()).unwrap_err();
        assert_eq!(err, MathError::DimensionMismatch { expected: 5, actual: 2 });
    }

    #[test]
    fn view_trim() {
        let dates = dates();
        let values = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let view = SeriesView::new(&dates, values.view()).unwrap();
        let cut = trim_view(view, &DateRange::until(d(4)));
        assert_eq!(cut.dates(), &[d(3), d(4)]);
        assert_eq!(cut.values(), array![1.0, 2.0].view());
    }

    #[test]
    fn matrix_rows() {
        let dates = dates();
        let matrix = Array2::from_shape_fn((5, 2), |(i, j)| (i * 10 + j) as f64);
        let (ds, m) = trim_rows(&dates, matrix.view(), &DateRange::from(d(6))).unwrap();
        assert_eq!(ds, &[d(6), d(7)]);
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[0, 1]], 31.0);
    }
}

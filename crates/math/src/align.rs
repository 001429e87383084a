//! Alignment of sparse series onto a shared date grid.

use ndarray::{Array1, Array2};
use tessera_primitives::{Date, SeriesView};

/// Place a series onto `grid`, leaving NaN where the grid has no matching
/// observation. Observations off the grid are dropped.
///
/// Both inputs must be sorted; the join is a single O(n + m) merge.
#[must_use]
pub fn align_to_grid(view: SeriesView<'_>, grid: &[Date]) -> Array1<f64> {
    let dates = view.dates();
    let values = view.values();
    let mut out = Array1::from_elem(grid.len(), f64::NAN);
    let mut j = 0;
    for (i, g) in grid.iter().enumerate() {
        while j < dates.len() && dates[j] < *g {
            j += 1;
        }
        if j == dates.len() {
            break;
        }
        if dates[j] == *g {
            out[i] = values[j];
        }
    }
    out
}

/// Build a `(grid x series)` matrix, one column per view.
#[must_use]
pub fn align_columns(views: &[SeriesView<'_>], grid: &[Date]) -> Array2<f64> {
    let mut matrix = Array2::from_elem((grid.len(), views.len()), f64::NAN);
    for (j, view) in views.iter().enumerate() {
        matrix.column_mut(j).assign(&align_to_grid(*view, grid));
    }
    matrix
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn sparse_series_gets_nan_gaps() {
        let dates = vec![d(1), d(3), d(6)];
        let values = array![1.0, 3.0, 6.0];
        let view = SeriesView::new(&dates, values.view()).unwrap();
        let grid: Vec<Date> = (2..=5).map(d).collect();
        let out = align_to_grid(view, &grid);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 3.0);
        assert!(out[2].is_nan() && out[3].is_nan());
    }

    #[test]
    fn columns() {
        let a_dates = vec![d(1), d(2)];
        let a_values = array![1.0, 2.0];
        let b_dates = vec![d(2)];
        let b_values = array![20.0];
        let views = [
            SeriesView::new(&a_dates, a_values.view()).unwrap(),
            SeriesView::new(&b_dates, b_values.view()).unwrap(),
        ];
        let m = align_columns(&views, &[d(1), d(2)]);
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[1, 1]], 20.0);
        assert!(m[[0, 1]].is_nan());
    }
}

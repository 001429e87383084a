//! Sample covariance and correlation of aligned series.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::MathError;

/// Annualized sample covariance with its sample size.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance {
    /// Symmetric `(series x series)` matrix.
    pub matrix: Array2<f64>,
    /// Complete rows used.
    pub observations: usize,
}

/// Keep only the rows with no missing value.
///
/// # Returns
/// The filtered matrix and a mask marking the kept rows of the input.
#[must_use]
pub fn drop_incomplete_rows(matrix: ArrayView2<'_, f64>) -> (Array2<f64>, Vec<bool>) {
    let mask: Vec<bool> =
        matrix.axis_iter(Axis(0)).map(|row| row.iter().all(|v| !v.is_nan())).collect();
    let kept: Vec<usize> = mask.iter().enumerate().filter(|(_, k)| **k).map(|(i, _)| i).collect();
    (matrix.select(Axis(0), &kept), mask)
}

/// Sample covariance of the columns of `matrix`, multiplied by `scale`.
///
/// Rows are dates and columns are series. Rows with any NaN are dropped
/// first; the estimator uses the `n - 1` denominator.
///
/// # Arguments
/// * `matrix` - `(dates x series)` values
/// * `scale` - Annualization factor (e.g. 252 for daily data)
///
/// # Errors
/// Returns `MathError::EmptyData` for zero columns and
/// `MathError::InsufficientData` if fewer than two complete rows remain.
pub fn covariance(matrix: ArrayView2<'_, f64>, scale: f64) -> Result<Covariance, MathError> {
    if matrix.ncols() == 0 {
        return Err(MathError::EmptyData);
    }
    let (complete, _) = drop_incomplete_rows(matrix);
    let n = complete.nrows();
    if n < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: n });
    }

    let mean = complete.mean_axis(Axis(0)).ok_or(MathError::EmptyData)?;
    let centered = &complete - &mean;
    let cov = centered.t().dot(&centered) * (scale / (n - 1) as f64);
    Ok(Covariance { matrix: cov, observations: n })
}

/// Pearson correlation of the columns of `matrix`.
///
/// The diagonal is 1. A column with zero variance has NaN correlations.
///
/// # Errors
/// Same as [`covariance`].
pub fn correlation(matrix: ArrayView2<'_, f64>) -> Result<Covariance, MathError> {
    let Covariance { matrix: cov, observations } = covariance(matrix, 1.0)?;
    let std: Array1<f64> = cov.diag().mapv(f64::sqrt);
    let k = cov.nrows();
    let corr = Array2::from_shape_fn((k, k), |(i, j)| {
        if i == j {
            1.0
        } else if std[i] == 0.0 || std[j] == 0.0 {
            f64::NAN
        } else {
            (cov[[i, j]] / (std[i] * std[j])).clamp(-1.0, 1.0)
        }
    });
    Ok(Covariance { matrix: corr, observations })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn scaled_copy_has_unit_correlation() {
        let m = array![[1.0, 2.0], [2.0, 4.0], [4.0, 8.0], [3.0, 6.0]];
        let corr = correlation(m.view()).unwrap();
        assert_relative_eq!(corr.matrix[[0, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr.matrix[[1, 0]], 1.0, epsilon = 1e-12);
        assert_eq!(corr.matrix[[0, 0]], 1.0);
    }

    #[test]
    fn sample_covariance_matches_hand_computation() {
        let m = array![[1.0, 3.0], [2.0, 1.0], [3.0, 2.0]];
        let cov = covariance(m.view(), 1.0).unwrap();
        // var(x) = 1, var(y) = 1, cov(x, y) = -0.5
        assert_relative_eq!(cov.matrix[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov.matrix[[1, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov.matrix[[0, 1]], -0.5, epsilon = 1e-12);
        assert_eq!(cov.observations, 3);

        let annual = covariance(m.view(), 252.0).unwrap();
        assert_relative_eq!(annual.matrix[[0, 1]], -126.0, epsilon = 1e-9);
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let m = array![[1.0, f64::NAN], [1.0, 2.0], [2.0, 3.0], [f64::NAN, 1.0], [3.0, 4.0]];
        let (kept, mask) = drop_incomplete_rows(m.view());
        assert_eq!(mask, vec![false, true, true, false, true]);
        assert_eq!(kept.nrows(), 3);
        assert_eq!(covariance(m.view(), 1.0).unwrap().observations, 3);
    }

    #[test]
    fn too_few_rows() {
        let m = array![[1.0, 2.0], [f64::NAN, 3.0]];
        assert_eq!(
            covariance(m.view(), 252.0).unwrap_err(),
            MathError::InsufficientData { required: 2, actual: 1 }
        );
    }

    #[test]
    fn no_columns() {
        let m = Array2::<f64>::zeros((5, 0));
        assert_eq!(covariance(m.view(), 1.0).unwrap_err(), MathError::EmptyData);
    }

    #[test]
    fn constant_column_yields_nan() {
        let m = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let corr = correlation(m.view()).unwrap();
        assert!(corr.matrix[[0, 1]].is_nan());
        assert_eq!(corr.matrix.diag().to_vec(), vec![1.0, 1.0]);
    }
}

//! Regression beta of a series against a benchmark.

use ndarray::{Array1, ArrayView1};
use tessera_primitives::Date;

use crate::{MathError, rolling_sum};

/// Ordinary least squares fit of `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaResult {
    /// Regression slope (the beta).
    pub slope: f64,
    /// Blume-adjusted beta, `1/3 + 2/3 * slope`.
    pub adjusted: f64,
    /// Regression intercept.
    pub intercept: f64,
    /// Complete pairs used.
    pub observations: usize,
}

/// Rolling betas dated by window end.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingBeta {
    /// Window end dates.
    pub dates: Vec<Date>,
    /// Slopes.
    pub slope: Array1<f64>,
    /// Adjusted slopes.
    pub adjusted: Array1<f64>,
    /// Intercepts.
    pub intercept: Array1<f64>,
}

fn adjust(slope: f64) -> f64 {
    1.0 / 3.0 + 2.0 / 3.0 * slope
}

fn complete_pairs(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>) -> Vec<usize> {
    (0..y.len()).filter(|&i| !y[i].is_nan() && !x[i].is_nan()).collect()
}

fn check_lengths(y: usize, x: usize) -> Result<(), MathError> {
    if y == x { Ok(()) } else { Err(MathError::DimensionMismatch { expected: y, actual: x }) }
}

/// Beta of `y` against the benchmark `x`, using complete pairs only.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the lengths differ and
/// `MathError::InsufficientData` with fewer than two complete pairs.
pub fn beta(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>) -> Result<BetaResult, MathError> {
    check_lengths(y.len(), x.len())?;
    let idx = complete_pairs(y, x);
    let n = idx.len();
    if n < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: n });
    }
    let mx = idx.iter().map(|&i| x[i]).sum::<f64>() / n as f64;
    let my = idx.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
    let (sxy, sxx) = idx.iter().fold((0.0, 0.0), |(sxy, sxx), &i| {
        let dx = x[i] - mx;
        (sxy + dx * (y[i] - my), sxx + dx * dx)
    });
    let slope = sxy / sxx;
    Ok(BetaResult { slope, adjusted: adjust(slope), intercept: my - slope * mx, observations: n })
}

/// Rolling beta over windows of `window` complete pairs.
///
/// Incomplete pairs are removed first; windows are then computed from
/// rolling sums of `x`, `y`, `xy` and `xx`.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the inputs differ in length and
/// `MathError::InvalidWindow` for a window below 2.
pub fn rolling_beta(
    dates: &[Date],
    y: ArrayView1<'_, f64>,
    x: ArrayView1<'_, f64>,
    window: usize,
) -> Result<RollingBeta, MathError> {
    check_lengths(dates.len(), y.len())?;
    check_lengths(y.len(), x.len())?;
    if window < 2 {
        return Err(MathError::InvalidWindow(format!("beta window must be at least 2, got {window}")));
    }

    let idx = complete_pairs(y, x);
    let xs = Array1::from_iter(idx.iter().map(|&i| x[i]));
    let ys = Array1::from_iter(idx.iter().map(|&i| y[i]));

    let sum_x = rolling_sum(xs.view(), window)?;
    let sum_y = rolling_sum(ys.view(), window)?;
    let sum_xy = rolling_sum((&xs * &ys).view(), window)?;
    let sum_xx = rolling_sum((&xs * &xs).view(), window)?;

    let w = window as f64;
    let slope = (&sum_xy * w - &sum_x * &sum_y) / (&sum_xx * w - &sum_x * &sum_x);
    let intercept = (&sum_y - &(&slope * &sum_x)) / w;
    let adjusted = slope.mapv(adjust);
    let dates = idx.iter().skip(window - 1).map(|&i| dates[i]).collect();

    Ok(RollingBeta { dates, slope, adjusted, intercept })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn exact_linear_relation() {
        let x = array![0.01, -0.02, 0.03, 0.0, 0.015];
        let y = x.mapv(|v| 2.0 * v + 0.001);
        let b = beta(y.view(), x.view()).unwrap();
        assert_relative_eq!(b.slope, 2.0, epsilon = 1e-10);
        assert_relative_eq!(b.intercept, 0.001, epsilon = 1e-12);
        assert_relative_eq!(b.adjusted, 1.0 / 3.0 + 4.0 / 3.0, epsilon = 1e-10);
        assert_eq!(b.observations, 5);
    }

    #[test]
    fn incomplete_pairs_are_ignored() {
        let x = array![1.0, f64::NAN, 2.0, 3.0];
        let y = array![2.0, 5.0, f64::NAN, 6.0];
        let b = beta(y.view(), x.view()).unwrap();
        assert_eq!(b.observations, 2);
        assert_relative_eq!(b.slope, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rolling_matches_static_on_each_window() {
        let dates: Vec<Date> = (1..=6).map(|d| Date::from_ymd_opt(2024, 1, d).unwrap()).collect();
        let x = array![0.1, -0.2, 0.05, 0.3, -0.1, 0.2];
        let y = array![0.15, -0.1, 0.0, 0.4, -0.3, 0.1];
        let r = rolling_beta(&dates, y.view(), x.view(), 3).unwrap();
        assert_eq!(r.dates, dates[2..].to_vec());
        for k in 0..r.slope.len() {
            let b = beta(y.slice(ndarray::s![k..k + 3]), x.slice(ndarray::s![k..k + 3])).unwrap();
            assert_relative_eq!(r.slope[k], b.slope, epsilon = 1e-9);
            assert_relative_eq!(r.intercept[k], b.intercept, epsilon = 1e-9);
        }
    }

    #[test]
    fn mismatched_lengths() {
        let x = array![1.0, 2.0];
        let y = array![1.0];
        assert!(matches!(beta(y.view(), x.view()), Err(MathError::DimensionMismatch { .. })));
    }
}

//! Returns computed from price series.

use ndarray::{Array1, ArrayView1};

use crate::{MathError, last_valid_index, next_valid_index};

/// Period-over-period simple returns `p[t] / p[t-1] - 1`.
///
/// The first entry, and any entry touching a missing price, is NaN.
#[must_use]
pub fn simple_returns(prices: ArrayView1<'_, f64>) -> Array1<f64> {
    step_returns(prices, |prev, cur| cur / prev - 1.0)
}

/// Period-over-period log returns `ln(p[t] / p[t-1])`.
#[must_use]
pub fn log_returns(prices: ArrayView1<'_, f64>) -> Array1<f64> {
    step_returns(prices, |prev, cur| (cur / prev).ln())
}

fn step_returns(prices: ArrayView1<'_, f64>, f: impl Fn(f64, f64) -> f64) -> Array1<f64> {
    let mut out = Array1::from_elem(prices.len(), f64::NAN);
    for t in 1..prices.len() {
        out[t] = f(prices[t - 1], prices[t]);
    }
    out
}

/// Return from the first to the last valid price.
///
/// # Arguments
/// * `prices` - Price series, possibly with gaps
/// * `log` - Whether to return the log return
///
/// # Errors
/// Returns `MathError::EmptySeries` or `MathError::AllMissing` if no valid
/// price exists.
pub fn total_return(prices: ArrayView1<'_, f64>, log: bool) -> Result<f64, MathError> {
    let first = prices[next_valid_index(prices, 0)?];
    let last = prices[last_valid_index(prices)?];
    let ratio = last / first;
    Ok(if log { ratio.ln() } else { ratio - 1.0 })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn simple_and_log() {
        let p = array![100.0, 110.0, f64::NAN, 121.0];
        let r = simple_returns(p.view());
        assert!(r[0].is_nan());
        assert_relative_eq!(r[1], 0.1, epsilon = 1e-12);
        assert!(r[2].is_nan() && r[3].is_nan());

        let l = log_returns(array![1.0, std::f64::consts::E].view());
        assert_relative_eq!(l[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn total_return_skips_gaps() {
        let p = array![f64::NAN, 100.0, 105.0, 120.0, f64::NAN];
        assert_relative_eq!(total_return(p.view(), false).unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(total_return(p.view(), true).unwrap(), 1.2_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn total_return_errors() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(total_return(empty.view(), false), Err(MathError::EmptySeries));
        let gaps = array![f64::NAN, f64::NAN];
        assert_eq!(total_return(gaps.view(), false), Err(MathError::AllMissing));
    }
}

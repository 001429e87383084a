//! Rolling-window sums and means.
//!
//! Missing values contribute zero to every sum. Results are aligned to the
//! end of each window.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::MathError;

/// Summation kernel used for rolling sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SumMethod {
    /// Difference of a running cumulative sum. O(n); rounding error grows
    /// with the magnitude of the prefix sum.
    #[default]
    CumulativeDifference,
    /// Re-sum every window. O(n * w).
    Direct,
    /// Sliding Neumaier-compensated sum. O(n).
    Compensated,
}

/// Rolling-window options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingOptions {
    /// Window length.
    pub window: usize,
    /// Shortest leading partial window to emit; defaults to `window`.
    pub min_periods: Option<usize>,
    /// Summation kernel.
    pub method: SumMethod,
}

impl RollingOptions {
    /// Full windows only, default kernel.
    #[must_use]
    pub const fn new(window: usize) -> Self {
        Self { window, min_periods: None, method: SumMethod::CumulativeDifference }
    }

    /// Set the minimum leading window length.
    #[must_use]
    pub const fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = Some(min_periods);
        self
    }

    /// Set the summation kernel.
    #[must_use]
    pub const fn with_method(mut self, method: SumMethod) -> Self {
        self.method = method;
        self
    }
}

/// Output of a rolling computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rolling {
    /// Input index of the first window end.
    pub offset: usize,
    /// One value per emitted window.
    pub values: Array1<f64>,
}

impl Rolling {
    fn empty(offset: usize) -> Self {
        Self { offset, values: Array1::zeros(0) }
    }
}

/// Rolling sum over full windows of length `window`.
///
/// # Returns
/// `n - window + 1` sums, or an empty array if `window > n`.
///
/// # Errors
/// Returns `MathError::InvalidWindow` if `window == 0`.
pub fn rolling_sum(values: ArrayView1<'_, f64>, window: usize) -> Result<Array1<f64>, MathError> {
    Ok(rolling_sum_with(values, &RollingOptions::new(window))?.values)
}

/// Rolling mean over full windows of length `window`.
///
/// # Errors
/// Returns `MathError::InvalidWindow` if `window == 0`.
pub fn rolling_mean(values: ArrayView1<'_, f64>, window: usize) -> Result<Array1<f64>, MathError> {
    Ok(rolling_mean_with(values, &RollingOptions::new(window))?.values)
}

/// Rolling sum with explicit options.
///
/// With `min_periods = m < window`, leading partial windows of length at
/// least `m` are emitted too and `offset` moves back to `m - 1`.
///
/// # Errors
/// Returns `MathError::InvalidWindow` if `window == 0`, `min_periods == 0`
/// or `min_periods > window`.
pub fn rolling_sum_with(
    values: ArrayView1<'_, f64>,
    options: &RollingOptions,
) -> Result<Rolling, MathError> {
    let (w, m) = validate(options)?;
    let n = values.len();
    let offset = m - 1;
    if m > n {
        return Ok(Rolling::empty(offset));
    }

    let sums = match options.method {
        SumMethod::CumulativeDifference => cumsum_windows(values, w, m),
        SumMethod::Direct => direct_windows(values, w, m),
        SumMethod::Compensated => compensated_windows(values, w, m),
    };
    Ok(Rolling { offset, values: sums })
}

/// Rolling mean with explicit options.
///
/// Each sum is divided by the number of positions its window covers, so
/// partial leading windows average over their actual length.
///
/// # Errors
/// Same as [`rolling_sum_with`].
pub fn rolling_mean_with(
    values: ArrayView1<'_, f64>,
    options: &RollingOptions,
) -> Result<Rolling, MathError> {
    let (w, _) = validate(options)?;
    let mut rolling = rolling_sum_with(values, options)?;
    let offset = rolling.offset;
    for (k, v) in rolling.values.iter_mut().enumerate() {
        let covered = (offset + k + 1).min(w);
        *v /= covered as f64;
    }
    Ok(rolling)
}

fn validate(options: &RollingOptions) -> Result<(usize, usize), MathError> {
    let w = options.window;
    if w == 0 {
        return Err(MathError::InvalidWindow("window must be positive".to_string()));
    }
    let m = options.min_periods.unwrap_or(w);
    if m == 0 || m > w {
        return Err(MathError::InvalidWindow(format!("min_periods {m} must be in 1..={w}")));
    }
    Ok((w, m))
}

#[inline]
fn nz(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

fn cumsum_windows(values: ArrayView1<'_, f64>, w: usize, m: usize) -> Array1<f64> {
    let n = values.len();
    let mut cum = Vec::with_capacity(n + 1);
    cum.push(0.0);
    let mut acc = 0.0;
    for &v in values {
        acc += nz(v);
        cum.push(acc);
    }
    Array1::from_iter((m..=n).map(|end| cum[end] - cum[end.saturating_sub(w)]))
}

fn direct_windows(values: ArrayView1<'_, f64>, w: usize, m: usize) -> Array1<f64> {
    let n = values.len();
    let partial = (m..w.min(n + 1)).map(|end| values.iter().take(end).copied().map(nz).sum::<f64>());
    let full = values.windows(w).into_iter().map(|win| win.iter().copied().map(nz).sum::<f64>());
    Array1::from_iter(partial.chain(full))
}

fn compensated_windows(values: ArrayView1<'_, f64>, w: usize, m: usize) -> Array1<f64> {
    let n = values.len();
    let mut out = Vec::with_capacity(n + 1 - m);
    let mut sum = 0.0;
    let mut comp = 0.0;
    for end in 1..=n {
        neumaier_add(nz(values[end - 1]), &mut sum, &mut comp);
        if end > w {
            neumaier_add(-nz(values[end - 1 - w]), &mut sum, &mut comp);
        }
        if end >= m {
            out.push(sum + comp);
        }
    }
    Array1::from(out)
}

fn neumaier_add(x: f64, sum: &mut f64, comp: &mut f64) {
    let t = *sum + x;
    if sum.abs() >= x.abs() {
        *comp += (*sum - t) + x;
    } else {
        *comp += (x - t) + *sum;
    }
    *sum = t;
}

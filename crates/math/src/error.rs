//! Error types for time-series computations.

use tessera_primitives::SeriesError;

/// Errors that can occur during time-series computations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MathError {
    /// No observations to work on.
    #[error("empty series")]
    EmptySeries,

    /// Every observation is missing.
    #[error("all values are missing")]
    AllMissing,

    /// Not enough complete observations.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations.
        required: usize,
        /// Observations available.
        actual: usize,
    },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Window size is unusable.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Result would break the series invariants.
    #[error(transparent)]
    Series(#[from] SeriesError),
}

impl MathError {
    /// Returns whether the error reflects missing data rather than a misuse.
    #[must_use]
    pub const fn is_data_shortage(&self) -> bool {
        matches!(self, Self::EmptySeries | Self::AllMissing | Self::InsufficientData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::InsufficientData { required: 2, actual: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2 observations, got 1");

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains("5"));

        assert!(MathError::AllMissing.is_data_shortage());
        assert!(!MathError::EmptyData.is_data_shortage());
    }
}

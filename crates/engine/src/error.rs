//! Error types for session operations.

use tessera_calendar::CalendarError;
use tessera_math::MathError;
use tessera_primitives::SeriesError;
use tessera_traits::StoreError;

/// Errors that can occur while running session operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Calendar error.
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Series invariant violated.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// Returns whether this error reflects absent data, so a caller can skip
    /// the series and continue.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_not_found(),
            Self::Math(err) => err.is_data_shortage(),
            _ => false,
        }
    }
}

//! Time-series store trait definitions.

use tessera_primitives::{
    AssetClass, Date, DateRange, SeriesError, SeriesKey, TimeSeries, Uid,
};

/// Errors that can occur while reading or writing stored series.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No series stored under this key.
    #[error("series not found: {0}")]
    NotFound(SeriesKey),

    /// The uid has not been registered with an asset class.
    #[error("unknown asset: {0}")]
    UnknownAsset(Uid),

    /// Datatype label has no code.
    #[error("unknown datatype: {0}")]
    UnknownDatatype(String),

    /// Write would break the series ordering invariants.
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    /// Backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns whether this error describes absent data rather than a fault.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnknownAsset(_))
    }
}

/// Read access to stored series keyed by `(uid, dtype)`.
pub trait SeriesStore {
    /// Fetch the full stored series.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` when no such series exists.
    fn fetch_series(&self, key: &SeriesKey) -> Result<TimeSeries, StoreError>;

    /// Fetch the stored observations falling inside `range`.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` when no such series exists, even if
    /// the range itself would select nothing.
    fn fetch_range(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, StoreError>;

    /// Whether a series is stored under `key`.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the lookup fails.
    fn contains(&self, key: &SeriesKey) -> Result<bool, StoreError>;

    /// All stored keys, sorted.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the listing fails.
    fn keys(&self) -> Result<Vec<SeriesKey>, StoreError>;
}

/// Write access used by the ingestion phase.
///
/// Missing (NaN) values are never persisted; readers get back only the
/// observed points.
pub trait SeriesWriter {
    /// Register an entity and the asset class deciding where its series live.
    ///
    /// Registering a known uid under another class keeps its stored series
    /// readable under the new class.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the registration fails.
    fn register_asset(&mut self, uid: &Uid, class: AssetClass) -> Result<(), StoreError>;

    /// Replace the whole series stored under `key`.
    ///
    /// Returns the number of observations written.
    ///
    /// # Errors
    /// Returns `StoreError::UnknownAsset` if the uid is not registered.
    fn write_series(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError>;

    /// Append observations after the stored tail.
    ///
    /// Returns the number of observations written.
    ///
    /// # Errors
    /// Returns `StoreError::Series` if the first new date does not follow
    /// the stored tail.
    fn append(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError>;

    /// Correct one historical observation.
    ///
    /// # Errors
    /// Returns `StoreError::Series` with `SeriesError::DateNotFound` if the
    /// date is not stored.
    fn correct(&mut self, key: &SeriesKey, date: Date, value: f64) -> Result<(), StoreError>;

    /// Delete a series, returning how many observations were removed.
    ///
    /// # Errors
    /// Returns `StoreError::UnknownAsset` if the uid is not registered.
    fn delete_series(&mut self, key: &SeriesKey) -> Result<usize, StoreError>;
}

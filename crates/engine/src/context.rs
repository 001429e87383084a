//! Explicit session context.

use ndarray::Array2;
use tessera_calendar::{Calendar, CalendarConfig, Horizon};
use tessera_math::{
    Aggregation, BetaResult, Covariance, RollingBeta, RollingOptions, ValidPoint, align_columns,
    align_to_grid, beta, correlation, covariance, last_valid_index_with, resample, rolling_beta,
    rolling_mean_with, rolling_sum_with, simple_returns, total_return, trim_rows,
};
use tessera_primitives::{Date, DateRange, Frequency, SeriesKey, TimeSeries};
use tessera_traits::{CalendarSource, SeriesStore};

use crate::{EngineConfig, EngineError};

/// A store, a calendar and the settings every computation of a session
/// shares.
#[derive(Debug)]
pub struct SeriesContext<S, C> {
    store: S,
    calendar: C,
    config: EngineConfig,
}

impl<S: SeriesStore> SeriesContext<S, Calendar> {
    /// Build the calendar from configuration and wrap it with `store`.
    ///
    /// # Errors
    /// Returns `EngineError::Calendar` if the calendar cannot be built and
    /// `EngineError::InvalidConfig` for an invalid engine configuration.
    pub fn from_config(
        store: S,
        calendar: &CalendarConfig,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let calendar = Calendar::new(calendar)?;
        Self::with_config(store, calendar, config)
    }

    /// Mutable access to the calendar, e.g. to move the elaboration date.
    pub const fn calendar_mut(&mut self) -> &mut Calendar {
        &mut self.calendar
    }
}

impl<S: SeriesStore, C: CalendarSource> SeriesContext<S, C> {
    /// Create a context with default configuration.
    #[must_use]
    pub fn new(store: S, calendar: C) -> Self {
        Self { store, calendar, config: EngineConfig::default() }
    }

    /// Create a context with a validated configuration.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if `config` fails validation.
    pub fn with_config(store: S, calendar: C, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { store, calendar, config })
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store for ingestion.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The calendar.
    #[must_use]
    pub const fn calendar(&self) -> &C {
        &self.calendar
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Split the context back into its parts.
    #[must_use]
    pub fn into_parts(self) -> (S, C, EngineConfig) {
        (self.store, self.calendar, self.config)
    }

    /// Range covering the `horizon` business days up to the elaboration date.
    ///
    /// A horizon of zero business days gives an empty range ending at t0.
    #[must_use]
    pub fn lookback(&self, horizon: &Horizon) -> DateRange {
        let grid = self.calendar.grid();
        let t0 = self.calendar.t0();
        if horizon.bdays() == 0 {
            return t0.succ_opt().map_or_else(
                || DateRange::between(Date::MAX, Date::MIN),
                |next| DateRange::between(next, t0),
            );
        }
        let end = grid.partition_point(|d| *d <= t0);
        let start = end.saturating_sub(horizon.bdays() as usize);
        match grid.get(start) {
            Some(first) => DateRange::between(*first, t0),
            None => DateRange::until(t0),
        }
    }

    /// Stored observations of `key` inside `range`.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the series does not exist.
    pub fn series(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, EngineError> {
        tracing::debug!(%key, ?range, "series");
        Ok(self.store.fetch_range(key, range)?)
    }

    /// `key` on the calendar grid, NaN where nothing was observed.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the series does not exist.
    pub fn aligned(&self, key: &SeriesKey) -> Result<TimeSeries, EngineError> {
        let (first, last) = self.calendar.calendar_range();
        let raw = self.store.fetch_range(key, &DateRange::between(first, last))?;
        let grid = self.calendar.grid();
        let values = align_to_grid(raw.view(), grid);
        tracing::debug!(%key, observed = raw.len(), grid = grid.len(), "aligned series");
        Ok(TimeSeries::new(grid.to_vec(), values)?)
    }

    fn aligned_in(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, EngineError> {
        let aligned = self.aligned(key)?;
        Ok(tessera_math::trim_view(aligned.view(), range).to_owned())
    }

    /// Most recent valid observation of `key` on or before `at`, defaulting
    /// to the calendar's elaboration date.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `EmptySeries` or `AllMissing` if no
    /// valid observation precedes `at`.
    pub fn last_value(&self, key: &SeriesKey, at: Option<Date>) -> Result<ValidPoint, EngineError> {
        let at = at.unwrap_or_else(|| self.calendar.t0());
        let raw = self.store.fetch_range(key, &DateRange::until(at))?;
        let index = last_valid_index_with(raw.values().view(), self.config.scan_policy)?;
        let point = ValidPoint { index, date: raw.dates()[index], value: raw.values()[index] };
        tracing::debug!(%key, %at, date = %point.date, value = point.value, "last value");
        Ok(point)
    }

    fn rolling_options(&self, window: usize) -> RollingOptions {
        RollingOptions {
            window,
            min_periods: self.config.min_periods.map(|m| m.min(window)),
            method: self.config.sum_method,
        }
    }

    /// Rolling sum of the aligned series, dated by window end.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `InvalidWindow` for a zero window.
    pub fn rolling_sum(
        &self,
        key: &SeriesKey,
        window: usize,
        range: &DateRange,
    ) -> Result<TimeSeries, EngineError> {
        let series = self.aligned_in(key, range)?;
        let rolling = rolling_sum_with(series.values().view(), &self.rolling_options(window))?;
        tracing::debug!(%key, window, windows = rolling.values.len(), "rolling sum");
        let dates = series.dates().iter().skip(rolling.offset).take(rolling.values.len()).copied();
        Ok(TimeSeries::new(dates.collect(), rolling.values)?)
    }

    /// Rolling mean of the aligned series, dated by window end.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `InvalidWindow` for a zero window.
    pub fn rolling_mean(
        &self,
        key: &SeriesKey,
        window: usize,
        range: &DateRange,
    ) -> Result<TimeSeries, EngineError> {
        let series = self.aligned_in(key, range)?;
        let rolling = rolling_mean_with(series.values().view(), &self.rolling_options(window))?;
        tracing::debug!(%key, window, windows = rolling.values.len(), "rolling mean");
        let dates = series.dates().iter().skip(rolling.offset).take(rolling.values.len()).copied();
        Ok(TimeSeries::new(dates.collect(), rolling.values)?)
    }

    /// Resample `key` under the configured missing-value policy, using the
    /// calendar grid for zero-filling.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the series does not exist.
    pub fn resample(
        &self,
        key: &SeriesKey,
        freq: Frequency,
        agg: Aggregation,
    ) -> Result<TimeSeries, EngineError> {
        let (first, last) = self.calendar.calendar_range();
        let raw = self.store.fetch_range(key, &DateRange::between(first, last))?;
        let out =
            resample(raw.view(), freq, agg, self.config.missing_policy, self.calendar.grid())?;
        tracing::debug!(%key, %freq, ?agg, periods = out.len(), "resampled");
        Ok(out)
    }

    fn aligned_matrix(
        &self,
        keys: &[SeriesKey],
        range: &DateRange,
    ) -> Result<(Vec<Date>, Array2<f64>), EngineError> {
        let (first, last) = self.calendar.calendar_range();
        let bounds = DateRange::between(first, last).intersect(range);
        let raw = keys
            .iter()
            .map(|key| self.store.fetch_range(key, &bounds))
            .collect::<Result<Vec<_>, _>>()?;
        let views: Vec<_> = raw.iter().map(TimeSeries::view).collect();
        let grid = self.calendar.grid();
        let matrix = align_columns(&views, grid);
        let (dates, matrix) = trim_rows(grid, matrix.view(), range)?;
        Ok((dates.to_vec(), matrix.to_owned()))
    }

    /// Annualized covariance of the aligned series over `range`.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `InsufficientData` if fewer than two
    /// dates have every series observed.
    pub fn covariance(
        &self,
        keys: &[SeriesKey],
        range: &DateRange,
    ) -> Result<Covariance, EngineError> {
        let (_, matrix) = self.aligned_matrix(keys, range)?;
        let cov = covariance(matrix.view(), self.config.annualization)?;
        tracing::debug!(series = keys.len(), observations = cov.observations, "covariance");
        Ok(cov)
    }

    /// Correlation of the aligned series over `range`.
    ///
    /// # Errors
    /// Same as [`Self::covariance`].
    pub fn correlation(
        &self,
        keys: &[SeriesKey],
        range: &DateRange,
    ) -> Result<Covariance, EngineError> {
        let (_, matrix) = self.aligned_matrix(keys, range)?;
        let corr = correlation(matrix.view())?;
        tracing::debug!(series = keys.len(), observations = corr.observations, "correlation");
        Ok(corr)
    }

    /// Simple returns of the aligned price series over `range`.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the series does not exist.
    pub fn returns(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, EngineError> {
        let prices = self.aligned_in(key, range)?;
        let returns = simple_returns(prices.values().view());
        Ok(TimeSeries::new(prices.dates().to_vec(), returns)?)
    }

    /// Return from the first to the last valid price inside `range`.
    ///
    /// # Errors
    /// Returns `EngineError::Math` if no valid price falls inside `range`.
    pub fn total_return(&self, key: &SeriesKey, range: &DateRange) -> Result<f64, EngineError> {
        let prices = self.store.fetch_range(key, range)?;
        Ok(total_return(prices.values().view(), false)?)
    }

    fn paired_returns(
        &self,
        key: &SeriesKey,
        benchmark: &SeriesKey,
        range: &DateRange,
    ) -> Result<(TimeSeries, TimeSeries), EngineError> {
        Ok((self.returns(key, range)?, self.returns(benchmark, range)?))
    }

    /// Beta of the returns of `key` against those of `benchmark`.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `InsufficientData` for fewer than two
    /// dates where both returns exist.
    pub fn beta(
        &self,
        key: &SeriesKey,
        benchmark: &SeriesKey,
        range: &DateRange,
    ) -> Result<BetaResult, EngineError> {
        let (y, x) = self.paired_returns(key, benchmark, range)?;
        let result = beta(y.values().view(), x.values().view())?;
        tracing::debug!(%key, %benchmark, slope = result.slope, "beta");
        Ok(result)
    }

    /// Rolling beta over windows of `window` complete return pairs.
    ///
    /// # Errors
    /// Returns `EngineError::Math` with `InvalidWindow` for a window below 2.
    pub fn rolling_beta(
        &self,
        key: &SeriesKey,
        benchmark: &SeriesKey,
        range: &DateRange,
        window: usize,
    ) -> Result<RollingBeta, EngineError> {
        let (y, x) = self.paired_returns(key, benchmark, range)?;
        Ok(rolling_beta(y.dates(), y.values().view(), x.values().view(), window)?)
    }
}

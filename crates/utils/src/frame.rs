//! Series and matrices as polars frames.

use chrono::Days;
use ndarray::ArrayView2;
use polars::prelude::*;
use tessera_primitives::{Date, TimeSeries};

use crate::UtilsError;

fn epoch() -> Date {
    Date::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Days since the Unix epoch, the physical representation of a polars `Date`.
pub(crate) fn to_epoch_days(date: Date) -> i32 {
    i32::try_from((date - epoch()).num_days()).unwrap_or(i32::MAX)
}

/// Inverse of [`to_epoch_days`].
pub(crate) fn from_epoch_days(days: i32) -> Option<Date> {
    let delta = Days::new(u64::from(days.unsigned_abs()));
    if days >= 0 { epoch().checked_add_days(delta) } else { epoch().checked_sub_days(delta) }
}

/// Build a polars `Date` column.
///
/// # Errors
/// Returns `UtilsError::Polars` if the cast fails.
pub fn date_column(name: &str, dates: &[Date]) -> Result<Column, UtilsError> {
    let days: Vec<i32> = dates.iter().map(|d| to_epoch_days(*d)).collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

fn nullable(values: impl Iterator<Item = f64>) -> Vec<Option<f64>> {
    values.map(|v| if v.is_nan() { None } else { Some(v) }).collect()
}

/// Two-column frame: `date` and `name`, with NaN mapped to null.
///
/// # Errors
/// Returns `UtilsError::Polars` if the frame cannot be built.
pub fn series_frame(name: &str, series: &TimeSeries) -> Result<DataFrame, UtilsError> {
    let df = DataFrame::new(vec![
        date_column("date", series.dates())?,
        Column::new(name.into(), nullable(series.values().iter().copied())),
    ])?;
    Ok(df)
}

/// Frame with a `date` column followed by one column per matrix column.
///
/// # Errors
/// Returns `UtilsError::Polars` if the shapes disagree.
pub fn matrix_frame(
    dates: &[Date],
    names: &[String],
    matrix: ArrayView2<'_, f64>,
) -> Result<DataFrame, UtilsError> {
    let mut columns = Vec::with_capacity(names.len() + 1);
    columns.push(date_column("date", dates)?);
    for (name, column) in names.iter().zip(matrix.columns()) {
        columns.push(Column::new(name.as_str().into(), nullable(column.iter().copied())));
    }
    Ok(DataFrame::new(columns)?)
}

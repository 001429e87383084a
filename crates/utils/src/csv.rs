//! CSV ingestion and export.

use std::{fs::File, path::Path};

use polars::prelude::*;
use tessera_primitives::{Date, TimeSeries};

use crate::{UtilsError, frame::from_epoch_days};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

fn parse_date(row: usize, raw: &str) -> Result<Date, UtilsError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| Date::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| UtilsError::InvalidDate { row, value: raw.to_string() })
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, UtilsError> {
    df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))
}

fn read_dates(col: &Column) -> Result<Vec<Date>, UtilsError> {
    if col.dtype() == &DataType::Date {
        let days = col.cast(&DataType::Int32)?;
        return days
            .i32()?
            .into_iter()
            .enumerate()
            .map(|(row, d)| {
                d.and_then(from_epoch_days)
                    .ok_or_else(|| UtilsError::InvalidDate { row, value: format!("{d:?}") })
            })
            .collect();
    }
    let text = col.cast(&DataType::String)?;
    text.str()?
        .into_iter()
        .enumerate()
        .map(|(row, raw)| parse_date(row, raw.unwrap_or("")))
        .collect()
}

/// Read one series from a CSV file with a header row.
///
/// Dates may be ISO (`2024-01-31`), compact (`20240131`) or slash-separated.
/// Empty or non-numeric values become NaN. Rows may come in any order.
///
/// # Arguments
/// * `path` - CSV file
/// * `date_col` - Name of the date column
/// * `value_col` - Name of the value column
///
/// # Errors
/// Returns `UtilsError::MissingColumn` for an absent column,
/// `UtilsError::InvalidDate` for an unparsable date and `UtilsError::Series`
/// for duplicate dates.
pub fn read_series_csv(
    path: impl AsRef<Path>,
    date_col: &str,
    value_col: &str,
) -> Result<TimeSeries, UtilsError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;

    let dates = read_dates(column(&df, date_col)?)?;
    let values = column(&df, value_col)?.cast(&DataType::Float64)?;
    let pairs = dates
        .into_iter()
        .zip(values.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)))
        .collect::<Vec<_>>();
    Ok(TimeSeries::from_unsorted(pairs)?)
}

/// Write a frame to CSV with a header row.
///
/// # Errors
/// Returns `UtilsError::Io` if the file cannot be created and
/// `UtilsError::Polars` if serialization fails.
pub fn write_frame_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<(), UtilsError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ndarray::array;

    use super::*;
    use crate::series_frame;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_unsorted_rows() {
        let file = write_csv("date,close\n2024-01-03,11.0\n2024-01-02,10.0\n20240104,\n");
        let series = read_series_csv(file.path(), "date", "close").unwrap();
        assert_eq!(series.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(series.values()[0], 10.0);
        assert!(series.values()[2].is_nan());
    }

    #[test]
    fn rejects_duplicates_and_bad_dates() {
        let file = write_csv("date,close\n2024-01-02,1\n2024-01-02,2\n");
        assert!(matches!(read_series_csv(file.path(), "date", "close"), Err(UtilsError::Series(_))));

        let file = write_csv("date,close\nyesterday,1\n");
        assert!(matches!(
            read_series_csv(file.path(), "date", "close"),
            Err(UtilsError::InvalidDate { row: 0, .. })
        ));
    }

    #[test]
    fn missing_column() {
        let file = write_csv("date,close\n2024-01-02,1\n");
        assert!(matches!(
            read_series_csv(file.path(), "date", "open"),
            Err(UtilsError::MissingColumn(_))
        ));
    }

    #[test]
    fn export_then_import() {
        let series = TimeSeries::new(vec![d(2), d(3)], array![1.5, 2.5]).unwrap();
        let mut df = series_frame("close", &series).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("close.csv");
        write_frame_csv(&mut df, &path).unwrap();
        assert_eq!(read_series_csv(&path, "date", "close").unwrap(), series);
    }
}

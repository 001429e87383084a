//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tessera::{
    calendar::{Calendar, Horizon},
    engine::SeriesContext,
    math::{Aggregation, trim_view},
    primitives::{AssetClass, Date, DateRange, DtypeCode, Frequency, SeriesKey, Uid},
    store::SqliteStore,
    traits::{SeriesStore, SeriesWriter},
    utils::{matrix_frame, read_series_csv, series_frame, write_frame_csv},
};

use crate::config::Settings;

/// Create the database file and its schema.
pub(crate) fn init(database: &Path) -> Result<()> {
    let store = SqliteStore::open(database)
        .with_context(|| format!("opening {}", database.display()))?;
    let datatypes = store.datatypes()?;
    println!("Initialized {} ({} datatypes)", database.display(), datatypes.len());
    Ok(())
}

/// An opened warehouse plus its calendar.
pub(crate) struct Session {
    context: SeriesContext<SqliteStore, Calendar>,
}

impl Session {
    pub(crate) fn open(settings: &Settings) -> Result<Self> {
        let store = SqliteStore::open(&settings.database)
            .with_context(|| format!("opening {}", settings.database.display()))?;
        let context =
            SeriesContext::from_config(store, &settings.calendar, settings.engine.clone())
                .context("building calendar")?;
        Ok(Self { context })
    }

    pub(crate) fn set_t0(&mut self, t0: Date) -> Result<()> {
        self.context.calendar_mut().set_t0(t0)?;
        Ok(())
    }

    pub(crate) fn register(&mut self, uid: &str, class: AssetClass) -> Result<()> {
        self.context.store_mut().register_asset(&Uid::new(uid), class)?;
        println!("Registered {uid} as {class}");
        Ok(())
    }

    pub(crate) fn datatype(&mut self, label: Option<&str>, code: Option<i64>) -> Result<()> {
        match (label, code) {
            (Some(label), Some(code)) => {
                if self.context.store_mut().register_datatype(label, DtypeCode::new(code))? {
                    println!("Registered datatype {label} = {code}");
                } else {
                    println!("Datatype {label} already registered");
                }
            }
            (Some(label), None) => {
                let code = self.context.store().datatype_code(label)?;
                println!("{label} = {}", code.0);
            }
            (None, _) => {
                for (label, code) in self.context.store().datatypes()?.iter() {
                    println!("{:>8}  {label}", code.0);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn import(
        &mut self,
        key: &SeriesKey,
        file: &Path,
        date_col: &str,
        value_col: &str,
        append: bool,
    ) -> Result<()> {
        let series = read_series_csv(file, date_col, value_col)
            .with_context(|| format!("reading {}", file.display()))?;
        let store = self.context.store_mut();
        let written =
            if append { store.append(key, &series)? } else { store.write_series(key, &series)? };
        tracing::info!(%key, rows = series.len(), written, append, "imported");
        println!("Wrote {written} observations to {key}");
        Ok(())
    }

    pub(crate) fn keys(&self) -> Result<()> {
        let store = self.context.store();
        for key in store.keys()? {
            let class = store.asset_class(&key.uid)?.map_or("?", |c| c.name());
            println!("{key}  {class}");
        }
        Ok(())
    }

    pub(crate) fn last(&self, key: &SeriesKey, at: Option<Date>) -> Result<()> {
        let point = self.context.last_value(key, at)?;
        println!("{key}  {}  {}", point.date, point.value);
        Ok(())
    }

    pub(crate) fn slice(
        &self,
        key: &SeriesKey,
        start: Option<Date>,
        end: Option<Date>,
        aligned: bool,
        output: Option<&Path>,
    ) -> Result<()> {
        let range = DateRange::new(start, end);
        let series = if aligned {
            let grid = self.context.aligned(key)?;
            trim_view(grid.view(), &range).to_owned()
        } else {
            self.context.series(key, &range)?
        };
        emit(series_frame(&key.to_string(), &series)?, output)
    }

    pub(crate) fn rolling(
        &self,
        key: &SeriesKey,
        window: usize,
        mean: bool,
        start: Option<Date>,
        end: Option<Date>,
        output: Option<&Path>,
    ) -> Result<()> {
        let range = DateRange::new(start, end);
        let series = if mean {
            self.context.rolling_mean(key, window, &range)?
        } else {
            self.context.rolling_sum(key, window, &range)?
        };
        emit(series_frame(&key.to_string(), &series)?, output)
    }

    pub(crate) fn resample(
        &self,
        key: &SeriesKey,
        freq: Frequency,
        agg: Aggregation,
        output: Option<&Path>,
    ) -> Result<()> {
        let series = self.context.resample(key, freq, agg)?;
        emit(series_frame(&key.to_string(), &series)?, output)
    }

    pub(crate) fn covariance(
        &self,
        keys: &[SeriesKey],
        horizon: &Horizon,
        correlation: bool,
    ) -> Result<()> {
        let range = self.context.lookback(horizon);
        let result = if correlation {
            self.context.correlation(keys, &range)?
        } else {
            self.context.covariance(keys, &range)?
        };
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut columns = Vec::with_capacity(names.len() + 1);
        columns.push(Column::new("series".into(), names.clone()));
        for (name, column) in names.iter().zip(result.matrix.columns()) {
            columns.push(Column::new(name.as_str().into(), column.to_vec()));
        }
        println!("{horizon} ending {} ({} observations)", self.t0(), result.observations);
        emit(DataFrame::new(columns)?, None)
    }

    pub(crate) fn beta(
        &self,
        key: &SeriesKey,
        benchmark: &SeriesKey,
        horizon: &Horizon,
        window: Option<usize>,
    ) -> Result<()> {
        let range = self.context.lookback(horizon);
        match window {
            None => {
                let beta = self.context.beta(key, benchmark, &range)?;
                println!(
                    "{key} vs {benchmark}: beta {:.4}  adjusted {:.4}  intercept {:.6}",
                    beta.slope, beta.adjusted, beta.intercept
                );
                println!("{} observations, {horizon} ending {}", beta.observations, self.t0());
                Ok(())
            }
            Some(window) => {
                let rolling = self.context.rolling_beta(key, benchmark, &range, window)?;
                let names = ["slope".to_string(), "adjusted".to_string(), "intercept".to_string()];
                let matrix = stack_columns(&[&rolling.slope, &rolling.adjusted, &rolling.intercept]);
                emit(matrix_frame(&rolling.dates, &names, matrix.view())?, None)
            }
        }
    }

    fn t0(&self) -> Date {
        self.context.calendar().t0()
    }
}

/// Columns side by side as a `(rows x columns)` matrix.
fn stack_columns(columns: &[&Array1<f64>]) -> Array2<f64> {
    let rows = columns.first().map_or(0, |c| c.len());
    Array2::from_shape_fn((rows, columns.len()), |(i, j)| columns[j][i])
}

/// Print `df`, or write it to `output` when given.
fn emit(mut df: DataFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_frame_csv(&mut df, path)?;
            println!("Wrote {} rows to {}", df.height(), path.display());
        }
        None => println!("{df}"),
    }
    Ok(())
}

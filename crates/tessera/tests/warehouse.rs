//! End-to-end tests: CSV ingestion into a SQLite warehouse, then analytics
//! through a session context.

use std::{fs, path::Path};

use approx::assert_relative_eq;
use tessera::{
    calendar::{Calendar, CalendarConfig, Horizon, business_days},
    engine::{EngineConfig, SeriesContext},
    math::{Aggregation, MissingPolicy},
    primitives::{AssetClass, Date, DateRange, Frequency, SeriesKey, TimeSeries, Uid},
    store::SqliteStore,
    traits::{SeriesStore, SeriesWriter},
    utils::{read_series_csv, series_frame, write_frame_csv},
};

fn d(m: u32, day: u32) -> Date {
    Date::from_ymd_opt(2024, m, day).unwrap()
}

/// Writes `date,value` rows for every business day of Q1 2024.
fn write_prices(path: &Path, scale: f64) {
    let mut csv = String::from("date,value\n");
    let grid = business_days(d(1, 1), d(3, 29));
    for (i, date) in grid.iter().enumerate() {
        let price = scale * (100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1);
        csv.push_str(&format!("{},{price}\n", date.format("%Y-%m-%d")));
    }
    fs::write(path, csv).unwrap();
}

fn open_session(path: &Path) -> SeriesContext<SqliteStore, Calendar> {
    let store = SqliteStore::open(path).unwrap();
    let calendar = CalendarConfig::between(d(1, 1), d(3, 29));
    SeriesContext::from_config(store, &calendar, EngineConfig::default()).unwrap()
}

#[test]
fn csv_to_analytics_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("warehouse.db");
    let acme_csv = dir.path().join("acme.csv");
    let mkt_csv = dir.path().join("mkt.csv");
    write_prices(&acme_csv, 2.0);
    write_prices(&mkt_csv, 1.0);

    let acme = SeriesKey::new("EQ_ACME", 1);
    let mkt = SeriesKey::new("IDX_MKT", 1);
    {
        let mut store = SqliteStore::open(&db).unwrap();
        store.register_asset(&acme.uid, AssetClass::Equity).unwrap();
        store.register_asset(&mkt.uid, AssetClass::Index).unwrap();
        for (key, path) in [(&acme, &acme_csv), (&mkt, &mkt_csv)] {
            let series = read_series_csv(path, "date", "value").unwrap();
            assert_eq!(store.write_series(key, &series).unwrap(), series.len());
        }
    }

    // Reopen to check persistence.
    let session = open_session(&db);
    assert_eq!(session.store().keys().unwrap(), vec![acme.clone(), mkt.clone()]);
    assert_eq!(session.store().asset_class(&Uid::new("IDX_MKT")).unwrap(), Some(AssetClass::Index));

    // t0 defaults to the business day before the calendar end.
    let last = session.last_value(&acme, None).unwrap();
    assert_eq!(last.date, d(3, 28));

    // Prices differ by a constant factor, so returns coincide.
    let range = session.lookback(&"1M".parse::<Horizon>().unwrap());
    let beta = session.beta(&acme, &mkt, &range).unwrap();
    assert_relative_eq!(beta.slope, 1.0, epsilon = 1e-9);
    assert_relative_eq!(beta.intercept, 0.0, epsilon = 1e-9);

    let corr = session.correlation(&[acme.clone(), mkt.clone()], &DateRange::all()).unwrap();
    assert_relative_eq!(corr.matrix[[0, 1]], 1.0, epsilon = 1e-9);

    let monthly = session.resample(&acme, Frequency::Monthly, Aggregation::Last).unwrap();
    assert_eq!(monthly.dates(), &[d(1, 1), d(2, 1), d(3, 1)]);
    let stored = session.series(&acme, &DateRange::from(d(3, 29))).unwrap();
    assert_eq!(monthly.get(d(3, 1)), stored.get(d(3, 29)));
}

#[test]
fn append_and_sparse_resample() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sparse.db");
    let key = SeriesKey::new("EQ_DIV", 7);
    {
        let mut store = SqliteStore::open(&db).unwrap();
        store.register_asset(&key.uid, AssetClass::Equity).unwrap();
        assert!(store.register_datatype("dividend", key.dtype).unwrap());
        let first = TimeSeries::from_unsorted(vec![(d(1, 15), 0.5)]).unwrap();
        store.write_series(&key, &first).unwrap();
        let later = TimeSeries::from_unsorted(vec![(d(3, 15), 0.6)]).unwrap();
        assert_eq!(store.append(&key, &later).unwrap(), 1);
        assert!(store.append(&key, &first).is_err());
    }

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.datatype_code("dividend").unwrap(), key.dtype);
    let calendar = CalendarConfig::between(d(1, 1), d(3, 29));

    let zero_fill = SeriesContext::from_config(store, &calendar, EngineConfig::default()).unwrap();
    let sums = zero_fill.resample(&key, Frequency::Monthly, Aggregation::Sum).unwrap();
    assert_eq!(sums.dates(), &[d(1, 1), d(2, 1), d(3, 1)]);
    assert_eq!(sums.get(d(2, 1)), Some(0.0));

    let (store, _, _) = zero_fill.into_parts();
    let config = EngineConfig { missing_policy: MissingPolicy::Skip, ..EngineConfig::default() };
    let skip = SeriesContext::from_config(store, &calendar, config).unwrap();
    let sums = skip.resample(&key, Frequency::Monthly, Aggregation::Sum).unwrap();
    assert_eq!(sums.dates(), &[d(1, 1), d(3, 1)]);

    let out = dir.path().join("dividends.csv");
    let mut frame = series_frame("EQ_DIV:7", &sums).unwrap();
    write_frame_csv(&mut frame, &out).unwrap();
    let back = read_series_csv(&out, "date", "EQ_DIV:7").unwrap();
    assert_eq!(back.dates(), sums.dates());
}

//! Example: An Analytics Session over Synthetic Prices
//!
//! Builds an in-memory warehouse with two equities and an index, then runs
//! the session kernels against a one-year business-day calendar:
//! - last valid value as of the elaboration date
//! - rolling mean and monthly resampling
//! - annualized covariance and correlation
//! - beta and rolling beta against the index

use tessera::{
    calendar::{CalendarConfig, Horizon, business_days},
    engine::{EngineConfig, SeriesContext},
    math::Aggregation,
    primitives::{AssetClass, Date, DateRange, Frequency, SeriesKey, TimeSeries},
    store::SqliteStore,
    traits::SeriesWriter,
    utils::series_frame,
};

/// Price path loading on the market, plus a small idiosyncratic cycle.
fn price_path(market: &[f64], loading: f64, phase: f64) -> Vec<f64> {
    market
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let idio = 0.01 * ((i as f64) * 0.37 + phase).sin();
            m.powf(loading) * (1.0 + idio)
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tessera Analytics Session ===\n");

    let start = Date::from_ymd_opt(2023, 1, 2).ok_or("bad start date")?;
    let end = Date::from_ymd_opt(2023, 12, 29).ok_or("bad end date")?;
    let dates = business_days(start, end);

    // =========================================================================
    // LOAD THE WAREHOUSE
    // =========================================================================

    let market: Vec<f64> = (0..dates.len())
        .map(|i| 100.0 * (1.0 + 0.0004 * i as f64 + 0.03 * (i as f64 * 0.05).sin()))
        .collect();

    let mut store = SqliteStore::in_memory()?;
    let index = SeriesKey::new("IDX_MKT", 1);
    let tech = SeriesKey::new("EQ_TECH", 1);
    let util = SeriesKey::new("EQ_UTIL", 1);
    store.register_datatype("close", index.dtype)?;
    store.register_asset(&index.uid, AssetClass::Index)?;
    store.register_asset(&tech.uid, AssetClass::Equity)?;
    store.register_asset(&util.uid, AssetClass::Equity)?;

    let series = [
        (&index, market.clone()),
        (&tech, price_path(&market, 1.4, 0.0)),
        (&util, price_path(&market, 0.6, 1.5)),
    ];
    for (key, prices) in series {
        // Drop every tenth observation to exercise gap handling.
        let pairs = dates
            .iter()
            .zip(prices)
            .enumerate()
            .filter(|(i, _)| i % 10 != 7)
            .map(|(_, (d, p))| (*d, p))
            .collect();
        let written = store.write_series(key, &TimeSeries::from_unsorted(pairs)?)?;
        println!("  {key:<10} {written} observations");
    }

    let calendar = CalendarConfig::between(start, end);
    let session = SeriesContext::from_config(store, &calendar, EngineConfig::default())?;
    println!("\nElaboration date: {}\n", session.calendar().t0());

    // =========================================================================
    // POINT AND ROLLING QUERIES
    // =========================================================================

    let last = session.last_value(&tech, None)?;
    println!("Last {tech}: {:.2} on {}", last.value, last.date);

    let quarter = session.lookback(&"1Q".parse::<Horizon>()?);
    let smooth = session.rolling_mean(&tech, 20, &quarter)?;
    println!("\n20-day rolling mean over the last quarter:");
    println!("{}", series_frame("EQ_TECH:1", &smooth)?.tail(Some(5)));

    let monthly = session.resample(&tech, Frequency::Monthly, Aggregation::Last)?;
    println!("\nMonth-end closes:");
    println!("{}", series_frame("EQ_TECH:1", &monthly)?);

    // =========================================================================
    // CROSS-SECTIONAL STATISTICS
    // =========================================================================

    let keys = [index.clone(), tech.clone(), util.clone()];
    let year = DateRange::all();
    let corr = session.correlation(&keys, &year)?;
    let cov = session.covariance(&keys, &year)?;
    println!("\nCorrelation of prices ({} complete rows):", corr.observations);
    println!("{:.3}", corr.matrix);
    println!("\nAnnualized covariance:");
    println!("{:.3}", cov.matrix);

    for key in [&tech, &util] {
        let beta = session.beta(key, &index, &year)?;
        println!(
            "\nBeta {key} vs {index}: {:.3} (adjusted {:.3}, {} returns)",
            beta.slope, beta.adjusted, beta.observations
        );
    }

    let rolling = session.rolling_beta(&tech, &index, &year, 60)?;
    if let (Some(date), Some(slope)) = (rolling.dates.last(), rolling.slope.iter().next_back()) {
        println!("60-observation beta of {tech} at {date}: {slope:.3}");
    }

    let total = session.total_return(&tech, &year)?;
    println!("\nTotal return of {tech}: {:.2}%", total * 100.0);

    Ok(())
}

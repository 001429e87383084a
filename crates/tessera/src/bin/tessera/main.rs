//! Tessera CLI binary.
//!
//! Ingests series into a SQLite warehouse and runs the analytics kernels
//! against the session calendar.

mod commands;
mod config;

use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tessera::{
    calendar::Horizon,
    math::Aggregation,
    primitives::{AssetClass, Date, Frequency, SeriesKey},
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{commands::Session, config::Settings};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Financial time-series warehouse and analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (TOML); defaults to ./tessera.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database, overrides the settings file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Elaboration date (YYYY-MM-DD), defaults to the last calendar date
    #[arg(long, global = true)]
    t0: Option<Date>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,

    /// Register an entity under an asset class
    Register {
        /// Entity uid
        uid: String,

        /// Asset class (equity, bond, fx, rate, index, derived, fundamentals)
        class: AssetClass,
    },

    /// Register a datatype label, or list the registered ones
    Datatype {
        /// Datatype label
        label: Option<String>,

        /// Numeric code
        code: Option<i64>,
    },

    /// Load a series from a CSV file
    Import {
        /// Target series as uid:dtype
        key: SeriesKey,

        /// CSV file
        file: PathBuf,

        /// Date column
        #[arg(long, default_value = "date")]
        date_col: String,

        /// Value column
        #[arg(long, default_value = "value")]
        value_col: String,

        /// Append after the last stored date instead of replacing
        #[arg(short, long)]
        append: bool,
    },

    /// List stored series
    Keys,

    /// Show the last valid observation
    Last {
        /// Series as uid:dtype
        key: SeriesKey,

        /// Look back from this date instead of t0
        #[arg(long)]
        at: Option<Date>,
    },

    /// Print a series over a date range
    Slice {
        /// Series as uid:dtype
        key: SeriesKey,

        #[command(flatten)]
        range: RangeArgs,

        /// Align onto the calendar grid
        #[arg(long)]
        aligned: bool,

        /// Write the result to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rolling sum or mean on the calendar grid
    Rolling {
        /// Series as uid:dtype
        key: SeriesKey,

        /// Window length in business days
        #[arg(short, long)]
        window: usize,

        /// Mean instead of sum
        #[arg(long)]
        mean: bool,

        #[command(flatten)]
        range: RangeArgs,

        /// Write the result to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resample a series to a coarser frequency
    Resample {
        /// Series as uid:dtype
        key: SeriesKey,

        /// Target frequency code (W, M, Q, Y)
        #[arg(short, long, default_value = "M")]
        freq: Frequency,

        /// Aggregation per period
        #[arg(short, long, value_enum, default_value_t = AggregationArg::Last)]
        agg: AggregationArg,

        /// Write the result to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Covariance or correlation matrix of several series
    Cov {
        /// Series as uid:dtype
        #[arg(required = true, num_args = 2..)]
        keys: Vec<SeriesKey>,

        /// Lookback horizon ending at t0 (e.g. 3M, 1Y)
        #[arg(short = 'H', long, default_value = "1Y")]
        horizon: Horizon,

        /// Correlation instead of annualized covariance
        #[arg(long)]
        correlation: bool,
    },

    /// Beta of a series against a benchmark
    Beta {
        /// Series as uid:dtype
        key: SeriesKey,

        /// Benchmark as uid:dtype
        benchmark: SeriesKey,

        /// Lookback horizon ending at t0
        #[arg(short = 'H', long, default_value = "1Y")]
        horizon: Horizon,

        /// Rolling window in return observations
        #[arg(short, long)]
        window: Option<usize>,
    },
}

/// Optional date bounds.
#[derive(clap::Args)]
struct RangeArgs {
    /// First date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<Date>,

    /// Last date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<Date>,
}

#[derive(Clone, Copy, ValueEnum)]
enum AggregationArg {
    /// Sum of values
    Sum,
    /// Mean of values
    Mean,
    /// Last observation
    Last,
    /// Number of observations
    Count,
}

impl From<AggregationArg> for Aggregation {
    fn from(value: AggregationArg) -> Self {
        match value {
            AggregationArg::Sum => Self::Sum,
            AggregationArg::Mean => Self::Mean,
            AggregationArg::Last => Self::Last,
            AggregationArg::Count => Self::Count,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber =
        FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber is already installed");
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(database) = cli.database {
        settings.database = database;
    }
    init_tracing(&settings.log_level);

    let command = match cli.command {
        Commands::Init => return commands::init(&settings.database),
        command => command,
    };

    let mut session = Session::open(&settings)?;
    if let Some(t0) = cli.t0 {
        session.set_t0(t0)?;
    }

    match command {
        Commands::Init => {}
        Commands::Register { uid, class } => session.register(&uid, class)?,
        Commands::Datatype { label, code } => session.datatype(label.as_deref(), code)?,
        Commands::Import { key, file, date_col, value_col, append } => {
            session.import(&key, &file, &date_col, &value_col, append)?;
        }
        Commands::Keys => session.keys()?,
        Commands::Last { key, at } => session.last(&key, at)?,
        Commands::Slice { key, range, aligned, output } => {
            session.slice(&key, range.start, range.end, aligned, output.as_deref())?;
        }
        Commands::Rolling { key, window, mean, range, output } => {
            session.rolling(&key, window, mean, range.start, range.end, output.as_deref())?;
        }
        Commands::Resample { key, freq, agg, output } => {
            session.resample(&key, freq, agg.into(), output.as_deref())?;
        }
        Commands::Cov { keys, horizon, correlation } => {
            session.covariance(&keys, &horizon, correlation)?;
        }
        Commands::Beta { key, benchmark, horizon, window } => {
            session.beta(&key, &benchmark, &horizon, window)?;
        }
    }

    Ok(())
}

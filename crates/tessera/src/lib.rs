//! # tessera
//!
//! A warehouse for financial time series keyed by `(uid, dtype)`, with a
//! business-day calendar and the numeric kernels used on top of it.
//!
//! This crate re-exports the tessera components behind feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Keys, date ranges and time series
//! - `traits`: Store and calendar abstractions
//! - `calendar`: Business-day calendar and horizons
//! - `math`: Slicing, last-valid, rolling, resampling and covariance kernels
//! - `store`: SQLite and in-memory stores
//! - `engine`: Session context tying store, calendar and kernels together
//! - `utils`: polars frames and CSV ingestion
//! - `cli`: The `tessera` command-line binary
//!
//! ## Example
//!
//! ```rust,ignore
//! // With default features (all components):
//! use tessera::engine::SeriesContext;
//! use tessera::store::SqliteStore;
//!
//! // Or with specific features only:
//! // [dependencies]
//! // tessera = { version = "0.1", default-features = false, features = ["math"] }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/tessera-rs/tessera/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Dependencies of the binary only.
#[cfg(feature = "cli")]
use {
    anyhow as _, clap as _, config as _, ndarray as _, polars as _, serde as _, tracing as _,
    tracing_subscriber as _,
};

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use tessera_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use tessera_traits as traits;
#[cfg(feature = "calendar")]
#[doc(inline)]
pub use tessera_calendar as calendar;
#[cfg(feature = "math")]
#[doc(inline)]
pub use tessera_math as math;
#[cfg(feature = "store")]
#[doc(inline)]
pub use tessera_store as store;
#[cfg(feature = "engine")]
#[doc(inline)]
pub use tessera_engine as engine;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use tessera_utils as utils;
